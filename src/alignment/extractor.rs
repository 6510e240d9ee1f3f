use std::io::{Read, Write};

use tracing::warn;

use crate::config::ScanConfig;
use crate::error::Result;
use crate::stream::ByteStream;

/// How gap bytes are treated while extracting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapPolicy {
    /// Skip gaps; `length` counts non-gap bytes only.
    Strip,
    /// Copy every byte verbatim; `length` counts raw bytes.
    Keep,
}

/// Outcome of a single extraction pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extraction {
    /// Characters requested by the caller.
    pub requested: u64,
    /// Characters written to the sink.
    pub emitted: u64,
    /// Raw bytes consumed from the stream, gaps included.
    pub consumed: u64,
}

impl Extraction {
    /// Returns `true` when the stream ran out before `requested` characters
    /// were emitted.
    pub fn is_short(&self) -> bool {
        self.emitted < self.requested
    }
}

/// Copies a bounded window of characters from an aligned stream to a sink.
#[derive(Debug, Clone, Copy)]
pub struct SubsequenceExtractor {
    config: ScanConfig,
}

impl SubsequenceExtractor {
    /// Create an extractor for the given gap configuration.
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Emit up to `length` characters from the stream's current position.
    ///
    /// Bytes are written to `sink` one at a time; wrap unbuffered sinks in a
    /// [`BufWriter`](std::io::BufWriter).
    ///
    /// Exhausting the stream early is not an error; the returned
    /// [`Extraction`] reports it through [`Extraction::is_short`] and a
    /// warning is logged.
    pub fn extract<R: Read, W: Write>(
        &self,
        stream: &mut ByteStream<R>,
        length: u64,
        policy: GapPolicy,
        sink: &mut W,
    ) -> Result<Extraction> {
        let mut emitted = 0u64;
        let mut consumed = 0u64;

        while emitted < length {
            let Some(byte) = stream.next_byte()? else {
                break;
            };
            consumed += 1;
            if policy == GapPolicy::Strip && self.config.is_gap(byte) {
                continue;
            }
            sink.write_all(&[byte])?;
            emitted += 1;
        }

        let extraction = Extraction {
            requested: length,
            emitted,
            consumed,
        };
        if extraction.is_short() {
            warn!(
                requested = length,
                emitted,
                "stream exhausted before the requested length was extracted"
            );
        }
        Ok(extraction)
    }
}
