//! Front ends composing resolution and extraction.
//!
//! [`RegionBatchDriver`] resolves each region once against the reference and
//! extracts it from every co-aligned source; [`SingleQueryDriver`] handles
//! one offset/length query against one input.

mod batch;
mod single;

pub use batch::{
    BatchConfig, BatchReport, FailurePolicy, RegionBatchDriver, ShortRecord, SkippedRegion, Source,
};
pub use single::{QueryMode, QueryOutcome, SingleQuery, SingleQueryDriver};
