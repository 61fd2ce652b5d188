//! File-based pickup workflow for the decomment stream.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::dfmap;
use crate::errors::PickupError;
use crate::piecefile;

use super::mapping::DecommentMapping;
use super::merge::DecommentMerger;
use super::piece::DecommentPiece;
use super::pickup::DecommentPickup;

pub const PICKUP_FILE_NAME: &str = "decomment-pickup.dfmap";

static PIECE_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^decomment-piece-.+-on-\d{8}-\d{9}-.+-[0-9A-Z]{8}\.dfmap$")
        .expect("piece file pattern is valid")
});

static MAPPING_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^decomment-mapping-.+-on-\d{8}-\d{9}-.+-[0-9A-Z]{8}\.dfmap$")
        .expect("mapping file pattern is valid")
});

/// Directory layout of one decomment store.
#[derive(Debug, Clone)]
pub struct DecommentPaths {
    pub piece_dir: PathBuf,
    pub mapping_dir: PathBuf,
    pub pickup_file: PathBuf,
}

impl DecommentPaths {
    /// Conventional layout under a decomment base directory.
    pub fn under(base: &Path) -> Self {
        Self {
            piece_dir: base.join("piece"),
            mapping_dir: base.join("mapping"),
            pickup_file: base.join("pickup").join(PICKUP_FILE_NAME),
        }
    }
}

/// One pickup run against a decomment store.
///
/// The process is the sole mutator of the store while it runs; concurrent
/// runs against the same directory are not supported (no file locking).
pub struct DecommentPickupProcess<C>
where
    C: Fn() -> NaiveDateTime,
{
    paths: DecommentPaths,
    merger: DecommentMerger<C>,
}

impl<C> DecommentPickupProcess<C>
where
    C: Fn() -> NaiveDateTime,
{
    pub fn new(paths: DecommentPaths, clock: C) -> Self {
        Self {
            paths,
            merger: DecommentMerger::new(clock),
        }
    }

    /// Read pieces, mappings, and the existing pickup; merge; persist.
    ///
    /// The merged pickup is written only when it has content; consumed piece
    /// and mapping files are deleted only after the write succeeded (or when
    /// there was nothing to write), so a failed write leaves every input in
    /// place for the next run.
    pub fn run(&self) -> Result<DecommentPickup, PickupError> {
        let piece_files = piecefile::sorted_dfmap_files(&self.paths.piece_dir)?;
        let pieces = read_pieces(&self.paths.piece_dir, &piece_files)?;
        let mapping_files = piecefile::sorted_dfmap_files(&self.paths.mapping_dir)?;
        let mappings = read_mappings(&self.paths.mapping_dir, &mapping_files)?;
        let existing = read_pickup(&self.paths.pickup_file)?;
        log::debug!(
            "decomment pickup: {} piece(s), {} mapping(s), existing pickup: {}",
            pieces.len(),
            mappings.len(),
            existing.is_some(),
        );

        let merged = self.merger.merge(existing, &pieces, &mappings);
        if !merged.is_empty() {
            dfmap::write_map_file(&self.paths.pickup_file, &merged.to_map())?;
        }

        delete_consumed(piece_files.iter().chain(mapping_files.iter()))?;
        Ok(merged)
    }
}

/// Stamp one piece into the piece directory.
///
/// Fails fast on empty comment text; that is an authoring bug, not data to
/// be persisted.
pub fn stamp_piece(piece_dir: &Path, piece: &DecommentPiece) -> Result<PathBuf, PickupError> {
    if piece.decomment.trim().is_empty() {
        return Err(PickupError::EmptyComment {
            target: piece.target_display(),
        });
    }
    let path = piece_dir.join(piece.file_name());
    dfmap::write_map_file(&path, &piece.to_map())?;
    Ok(path)
}

/// Stamp one mapping override into the mapping directory.
pub fn stamp_mapping(
    mapping_dir: &Path,
    mapping: &DecommentMapping,
) -> Result<PathBuf, PickupError> {
    let path = mapping_dir.join(mapping.file_name());
    dfmap::write_map_file(&path, &mapping.to_map())?;
    Ok(path)
}

fn read_pieces(dir: &Path, files: &[PathBuf]) -> Result<Vec<DecommentPiece>, PickupError> {
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
            DecommentPiece::from_map(&map).map_err(|err| dfmap::shape_error(path, err))?;
        pieces.push(piece);
    }
    Ok(pieces)
}

fn read_mappings(dir: &Path, files: &[PathBuf]) -> Result<Vec<DecommentMapping>, PickupError> {
    let mut mappings = Vec::with_capacity(files.len());
    for path in files {
        let name = piecefile::file_name_of(path);
        if !MAPPING_FILE.is_match(&name) {
            return Err(PickupError::InvalidPieceFileName {
                dir: dir.to_path_buf(),
                name,
            });
        }
        let map = dfmap::read_map_file(path)?;
        let mapping =
            DecommentMapping::from_map(&map).map_err(|err| dfmap::shape_error(path, err))?;
        mappings.push(mapping);
    }
    Ok(mappings)
}

/// Load the existing pickup; an absent file means a first run.
pub fn read_pickup(path: &Path) -> Result<Option<DecommentPickup>, PickupError> {
    if !path.exists() {
        return Ok(None);
    }
    let map = dfmap::read_map_file(path)?;
    let pickup = DecommentPickup::from_map(&map).map_err(|err| dfmap::shape_error(path, err))?;
    Ok(Some(pickup))
}

fn delete_consumed<'a>(files: impl Iterator<Item = &'a PathBuf>) -> Result<(), PickupError> {
    for path in files {
        std::fs::remove_file(path).map_err(|source| PickupError::DeletePiece {
            path: path.clone(),
            source,
        })?;
        log::debug!("deleted consumed file {}", path.display());
    }
    Ok(())
}
