//! Gap-aware coordinate translation and extraction.
//!
//! Aligned streams are padded with a single reserved gap byte so that every
//! stream of one alignment run shares the same column grid. Two coordinate
//! spaces are involved:
//!
//! - **ungapped** offsets count non-gap bytes only (the coordinate space of
//!   the original, unaligned reference);
//! - **raw** offsets are byte positions in the aligned file.
//!
//! [`OffsetResolver`] maps the former onto the latter, [`SubsequenceExtractor`]
//! copies a bounded window starting at a raw offset, and
//! [`resolve_and_extract`] does both in a single pass.

mod extractor;
mod fused;
mod resolver;

pub use extractor::{Extraction, GapPolicy, SubsequenceExtractor};
pub use fused::{resolve_and_extract, LocatedExtraction};
pub use resolver::OffsetResolver;

/// Byte position within an aligned stream, gaps included.
pub type RawOffset = u64;

/// Count of non-gap bytes preceding a position.
pub type UngappedOffset = u64;
