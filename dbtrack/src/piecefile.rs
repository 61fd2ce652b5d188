//! Shared helpers for directories of piece files.

use std::path::{Path, PathBuf};

use nanoid::nanoid;

use crate::errors::PickupError;

const CODE_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I',
    'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Random 8-character code identifying one piece or mapping.
pub fn generate_code() -> String {
    nanoid!(8, &CODE_ALPHABET)
}

/// All `.dfmap` files directly under `dir`, sorted by file name.
///
/// The lexicographic order is what makes last-writer-wins reproducible
/// across runs. An absent directory reads as empty.
pub(crate) fn sorted_dfmap_files(dir: &Path) -> Result<Vec<PathBuf>, PickupError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let entries = std::fs::read_dir(dir).map_err(|source| PickupError::ListDir {
        dir: dir.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| PickupError::ListDir {
            dir: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "dfmap") {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// File name of `path`, for naming-convention checks and error messages.
pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_code_shape() {
        let code = generate_code();
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_listing_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.dfmap"), "map:{}").unwrap();
        std::fs::write(dir.path().join("a.dfmap"), "map:{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let files = sorted_dfmap_files(dir.path()).unwrap();
        let names: Vec<String> = files.iter().map(|p| file_name_of(p)).collect();
        assert_eq!(names, vec!["a.dfmap", "b.dfmap"]);
    }

    #[test]
    fn test_absent_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let files = sorted_dfmap_files(&dir.path().join("missing")).unwrap();
        assert!(files.is_empty());
    }
}
