//! File-based pickup workflow for the hacomment stream.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::dfmap;
use crate::errors::PickupError;
use crate::piecefile;

use super::merge::HacommentMerger;
use super::piece::HacommentPiece;
use super::pickup::HacommentPickup;

pub const PICKUP_FILE_NAME: &str = "hacomment-pickup.dfmap";

static PIECE_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^hacomment-piece-.+-on-\d{8}-\d{9}-.+-[0-9A-Z]{8}\.dfmap$")
        .expect("piece file pattern is valid")
});

/// Directory layout of one hacomment store.
#[derive(Debug, Clone)]
pub struct HacommentPaths {
    pub piece_dir: PathBuf,
    pub pickup_file: PathBuf,
}

impl HacommentPaths {
    /// Conventional layout under a hacomment base directory.
    pub fn under(base: &Path) -> Self {
        Self {
            piece_dir: base.join("piece"),
            pickup_file: base.join("pickup").join(PICKUP_FILE_NAME),
        }
    }
}

/// One pickup run against a hacomment store.
pub struct HacommentPickupProcess<C>
where
    C: Fn() -> NaiveDateTime,
{
    paths: HacommentPaths,
    merger: HacommentMerger<C>,
}

impl<C> HacommentPickupProcess<C>
where
    C: Fn() -> NaiveDateTime,
{
    pub fn new(paths: HacommentPaths, clock: C) -> Self {
        Self {
            paths,
            merger: HacommentMerger::new(clock),
        }
    }

    /// Read pieces and the existing pickup; merge; persist.
    ///
    /// Write-before-delete, as in the decomment process: consumed pieces are
    /// removed only after a durable write, or when the merge produced
    /// nothing to write.
    pub fn run(&self) -> Result<HacommentPickup, PickupError> {
        let piece_files = piecefile::sorted_dfmap_files(&self.paths.piece_dir)?;
        let pieces = read_pieces(&self.paths.piece_dir, &piece_files)?;
        let existing = read_pickup(&self.paths.pickup_file)?;
        log::debug!(
            "hacomment pickup: {} piece(s), existing pickup: {}",
            pieces.len(),
            existing.is_some(),
        );

        let merged = self.merger.merge(existing, &pieces);
        if !merged.is_empty() {
            dfmap::write_map_file(&self.paths.pickup_file, &merged.to_map())?;
        }

        for path in &piece_files {
            std::fs::remove_file(path).map_err(|source| PickupError::DeletePiece {
                path: path.clone(),
                source,
            })?;
        }
        Ok(merged)
    }
}

/// Stamp one piece into the piece directory.
pub fn stamp_piece(piece_dir: &Path, piece: &HacommentPiece) -> Result<PathBuf, PickupError> {
    if piece.comment.trim().is_empty() {
        return Err(PickupError::EmptyComment {
            target: piece.target_display(),
        });
    }
    let path = piece_dir.join(piece.file_name());
    dfmap::write_map_file(&path, &piece.to_map())?;
    Ok(path)
}

fn read_pieces(dir: &Path, files: &[PathBuf]) -> Result<Vec<HacommentPiece>, PickupError> {
    let mut pieces = Vec::with_capacity(files.len());
    for path in files {
        let name = piecefile::file_name_of(path);
        if !PIECE_FILE.is_match(&name) {
            return Err(PickupError::InvalidPieceFileName {
                dir: dir.to_path_buf(),
                name,
            });
        }
        let map = dfmap::read_map_file(path)?;
        let piece =
            HacommentPiece::from_map(&map).map_err(|err| dfmap::shape_error(path, err))?;
        pieces.push(piece);
    }
    Ok(pieces)
}

/// Load the existing pickup; an absent file means a first run.
pub fn read_pickup(path: &Path) -> Result<Option<HacommentPickup>, PickupError> {
    if !path.exists() {
        return Ok(None);
    }
    let map = dfmap::read_map_file(path)?;
    let pickup = HacommentPickup::from_map(&map).map_err(|err| dfmap::shape_error(path, err))?;
    Ok(Some(pickup))
}
