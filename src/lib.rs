//! # Subsequence extraction from gap-padded multiple sequence alignments
//!
//! Every sequence of an alignment run is padded with a gap byte (`-`) to a
//! common column count. This library translates offsets given in the
//! coordinate space of the original, gap-free reference into raw file
//! offsets, and extracts regions from the reference and from any co-aligned
//! source at those offsets.
//!
//! ## Core Algorithm
//!
//! 1. **Chunked streaming**: files are read in fixed-size blocks and consumed
//!    one byte at a time, so memory use does not grow with file size
//! 2. **Offset resolution**: a forward scan counts non-gap bytes until the
//!    requested ungapped offset is reached
//! 3. **Extraction**: a second forward scan from the resolved offset emits
//!    characters, either skipping gaps or copying bytes verbatim
//!
//! ## Usage Example
//!
//! ```
//! use std::io::Cursor;
//! use multialign_extract::{ByteStream, GapPolicy, OffsetResolver, ScanConfig, SubsequenceExtractor};
//!
//! let config = ScanConfig::default();
//! let mut stream = ByteStream::new(Cursor::new(b"AC--GT-A".to_vec()));
//! let raw = OffsetResolver::new(config).resolve(&mut stream, 2)?;
//! assert_eq!(raw, 4);
//!
//! stream.seek(raw)?;
//! let mut out = Vec::new();
//! SubsequenceExtractor::new(config).extract(&mut stream, 2, GapPolicy::Strip, &mut out)?;
//! assert_eq!(out, b"GT");
//! # Ok::<(), multialign_extract::ExtractError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod alignment; // Offset resolution and extraction
pub mod config;    // Scan configuration
pub mod driver;    // Batch and single-query front ends
pub mod error;     // Error kinds
pub mod region;    // Region lists
pub mod stream;    // Chunked byte streams

// Re-exports for convenience
pub use alignment::{
    resolve_and_extract, Extraction, GapPolicy, LocatedExtraction, OffsetResolver, RawOffset,
    SubsequenceExtractor, UngappedOffset,
};
pub use config::{ScanConfig, DEFAULT_BUFFER_SIZE, DEFAULT_GAP};
pub use driver::{
    BatchConfig, BatchReport, FailurePolicy, QueryMode, QueryOutcome, RegionBatchDriver,
    SingleQuery, SingleQueryDriver, Source,
};
pub use error::{ExtractError, Result};
pub use region::{Region, RegionReader, Strand};
pub use stream::ByteStream;
