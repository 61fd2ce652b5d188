//! Conflict resolution for the hacomment stream.

use chrono::NaiveDateTime;

use super::piece::{FORMAT_VERSION, HacommentPiece};
use super::pickup::{HacommentEntry, HacommentPickup};

/// Merge engine for the hacomment stream.
///
/// Same contract as the decomment merger, without mapping overrides: pure
/// function of existing pickup, new pieces, and the injected clock.
pub struct HacommentMerger<C>
where
    C: Fn() -> NaiveDateTime,
{
    clock: C,
}

impl<C> HacommentMerger<C>
where
    C: Fn() -> NaiveDateTime,
{
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Fold pieces into the existing pickup, last writer wins per identity.
    ///
    /// Replaced identities update in place; new identities append in
    /// file-read order.
    pub fn merge(
        &self,
        existing: Option<HacommentPickup>,
        pieces: &[HacommentPiece],
    ) -> HacommentPickup {
        let mut entries = existing.map(|p| p.entries).unwrap_or_default();
        for piece in pieces {
            let entry = HacommentEntry::from_piece(piece);
            match entries.iter_mut().find(|e| e.identity() == entry.identity()) {
                Some(existing_entry) => *existing_entry = entry,
                None => entries.push(entry),
            }
        }
        HacommentPickup {
            format_version: FORMAT_VERSION.to_string(),
            pickup_datetime: (self.clock)(),
            entries,
        }
    }
}
