//! Decomment stream: free-form schema comments contributed as piece files
//! and consolidated into one canonical pickup file.
//!
//! A piece targets a table or one of its columns. The pickup groups the
//! current comments by table, with nested column entries. Mapping overrides
//! re-key existing comments when a table or column was renamed.

mod mapping;
mod merge;
mod piece;
mod pickup;
mod process;

pub use mapping::DecommentMapping;
pub use merge::DecommentMerger;
pub use piece::DecommentPiece;
pub use pickup::{DecommentPickup, DecommentProperty, PickupColumn, PickupTable};
pub use process::{DecommentPaths, DecommentPickupProcess, stamp_piece, stamp_mapping};
