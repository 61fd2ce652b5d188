//! Hacomment stream: a second documentation stream alongside decomments.
//!
//! Same piece/pickup/merge shape as the decomment stream, but flat: the
//! pickup holds at most one current annotation per schema element, with no
//! table grouping and no mapping overrides.

mod merge;
mod piece;
mod pickup;
mod process;

pub use merge::HacommentMerger;
pub use piece::HacommentPiece;
pub use pickup::{HacommentEntry, HacommentPickup};
pub use process::{HacommentPaths, HacommentPickupProcess, stamp_piece};
