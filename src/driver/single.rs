use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use tracing::info;

use crate::alignment::{
    resolve_and_extract, Extraction, GapPolicy, RawOffset, SubsequenceExtractor,
};
use crate::config::ScanConfig;
use crate::error::{ExtractError, Result};
use crate::stream::ByteStream;

/// Interpretation of the query offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// The offset is in ungapped reference coordinates; gaps are stripped.
    Reference,
    /// The offset is a raw file offset; bytes are copied verbatim.
    Raw,
}

/// A validated single extraction request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleQuery {
    /// Ungapped offset (reference mode) or raw offset (raw mode).
    pub offset: u64,
    /// Number of characters to emit; always > 0.
    pub length: u64,
    /// How `offset` and gaps are interpreted.
    pub mode: QueryMode,
}

impl SingleQuery {
    /// Build a query; `length` must be strictly positive.
    pub fn new(offset: u64, length: u64, mode: QueryMode) -> Result<Self> {
        if length == 0 {
            return Err(ExtractError::usage("length must be > 0"));
        }
        Ok(Self {
            offset,
            length,
            mode,
        })
    }

    /// Build a query from signed values as supplied on a command line.
    pub fn from_signed(offset: i64, length: i64, mode: QueryMode) -> Result<Self> {
        let offset = u64::try_from(offset)
            .map_err(|_| ExtractError::usage(format!("offset must be >= 0, got {}", offset)))?;
        let length = u64::try_from(length)
            .map_err(|_| ExtractError::usage(format!("length must be > 0, got {}", length)))?;
        Self::new(offset, length, mode)
    }
}

/// Result of a single query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOutcome {
    /// Raw offset discovered by resolution; `None` in raw mode.
    pub raw_offset: Option<RawOffset>,
    /// Extraction statistics.
    pub extraction: Extraction,
}

/// Runs one query against one aligned input.
#[derive(Debug, Clone, Copy)]
pub struct SingleQueryDriver {
    config: ScanConfig,
}

impl SingleQueryDriver {
    /// Create a driver with the given scan configuration.
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Open `path` and run the query, writing content to `sink`.
    pub fn run_path<P: AsRef<Path>, W: Write>(
        &self,
        path: P,
        query: &SingleQuery,
        sink: &mut W,
    ) -> Result<QueryOutcome> {
        let path = path.as_ref();
        info!(input = %path.display(), offset = query.offset, length = query.length, "handling query");
        let mut stream = ByteStream::<File>::open_with_capacity(path, self.config.buffer_size)?;
        self.run(&mut stream, query, sink)
    }

    /// Run the query against an already opened stream.
    ///
    /// Reference mode resolves and extracts in a single pass; raw mode seeks
    /// directly to `query.offset` and copies bytes verbatim.
    pub fn run<R: Read + Seek, W: Write>(
        &self,
        stream: &mut ByteStream<R>,
        query: &SingleQuery,
        sink: &mut W,
    ) -> Result<QueryOutcome> {
        match query.mode {
            QueryMode::Reference => {
                stream.rewind()?;
                let located =
                    resolve_and_extract(&self.config, stream, query.offset, query.length, sink)?;
                Ok(QueryOutcome {
                    raw_offset: Some(located.raw_offset),
                    extraction: located.extraction,
                })
            }
            QueryMode::Raw => {
                stream.seek(query.offset)?;
                let extraction = SubsequenceExtractor::new(self.config).extract(
                    stream,
                    query.length,
                    GapPolicy::Keep,
                    sink,
                )?;
                Ok(QueryOutcome {
                    raw_offset: None,
                    extraction,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn stream(data: &[u8]) -> ByteStream<Cursor<Vec<u8>>> {
        ByteStream::new(Cursor::new(data.to_vec()))
    }

    #[test]
    fn test_reference_mode_reports_offset() {
        let driver = SingleQueryDriver::new(ScanConfig::default());
        let query = SingleQuery::new(2, 2, QueryMode::Reference).unwrap();
        let mut out = Vec::new();
        let outcome = driver.run(&mut stream(b"AC--GT-A"), &query, &mut out).unwrap();
        assert_eq!(out, b"GT");
        assert_eq!(outcome.raw_offset, Some(4));
    }

    #[test]
    fn test_raw_mode_keeps_gaps() {
        let driver = SingleQueryDriver::new(ScanConfig::default());
        let query = SingleQuery::new(1, 5, QueryMode::Raw).unwrap();
        let mut out = Vec::new();
        let outcome = driver.run(&mut stream(b"AC--GT-A"), &query, &mut out).unwrap();
        assert_eq!(out, b"C--GT");
        assert_eq!(outcome.raw_offset, None);
        assert_eq!(outcome.extraction.emitted, 5);
    }

    #[test]
    fn test_usage_errors() {
        assert!(matches!(
            SingleQuery::from_signed(-1, 5, QueryMode::Raw),
            Err(ExtractError::Usage(_))
        ));
        assert!(matches!(
            SingleQuery::from_signed(0, 0, QueryMode::Raw),
            Err(ExtractError::Usage(_))
        ));
        assert!(matches!(
            SingleQuery::from_signed(0, -3, QueryMode::Reference),
            Err(ExtractError::Usage(_))
        ));
        assert!(SingleQuery::from_signed(0, 1, QueryMode::Reference).is_ok());
    }
}
