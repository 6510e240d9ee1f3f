use std::io::Read;

use tracing::debug;

use super::{RawOffset, UngappedOffset};
use crate::config::ScanConfig;
use crate::error::{ExtractError, Result};
use crate::stream::ByteStream;

/// Maps ungapped reference coordinates onto raw aligned file offsets.
///
/// The mapping is left-aligned: a resolved offset always points at a
/// non-gap byte, never into the run of gaps preceding it.
#[derive(Debug, Clone, Copy)]
pub struct OffsetResolver {
    config: ScanConfig,
}

impl OffsetResolver {
    /// Create a resolver for the given gap configuration.
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Scan forward from the stream's current position until `target`
    /// non-gap bytes have been passed and return the raw offset of the next
    /// non-gap byte.
    ///
    /// Callers position the stream at raw offset 0 for reference
    /// coordinates; [`resolve_from_start`](Self::resolve_from_start) does so.
    pub fn resolve<R: Read>(
        &self,
        stream: &mut ByteStream<R>,
        target: UngappedOffset,
    ) -> Result<RawOffset> {
        let mut ungapped: u64 = 0;
        let mut raw = stream.position();
        while let Some(byte) = stream.next_byte()? {
            if !self.config.is_gap(byte) {
                if ungapped == target {
                    debug!(target_offset = target, raw_offset = raw, "resolved ungapped offset");
                    return Ok(raw);
                }
                ungapped += 1;
            }
            raw += 1;
        }
        Err(ExtractError::OutOfRange {
            target,
            available: ungapped,
        })
    }

    /// Rewind the stream to raw offset 0, then [`resolve`](Self::resolve).
    pub fn resolve_from_start<R: Read + std::io::Seek>(
        &self,
        stream: &mut ByteStream<R>,
        target: UngappedOffset,
    ) -> Result<RawOffset> {
        stream.rewind()?;
        self.resolve(stream, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use test_case::test_case;

    fn resolve(data: &[u8], target: u64) -> Result<u64> {
        let mut stream = ByteStream::with_capacity(Cursor::new(data.to_vec()), 3)?;
        OffsetResolver::new(ScanConfig::default()).resolve(&mut stream, target)
    }

    #[test_case(b"AC--GT-A", 0, 0 ; "first base")]
    #[test_case(b"AC--GT-A", 1, 1 ; "before gap run")]
    #[test_case(b"AC--GT-A", 2, 4 ; "after gap run")]
    #[test_case(b"AC--GT-A", 4, 7 ; "last base")]
    #[test_case(b"---ACGT", 0, 3 ; "leading gaps skipped")]
    fn test_resolves(data: &[u8], target: u64, expected: u64) {
        assert_eq!(resolve(data, target).unwrap(), expected);
    }

    #[test]
    fn test_out_of_range_reports_available() {
        match resolve(b"AC--GT-A", 5) {
            Err(ExtractError::OutOfRange { target, available }) => {
                assert_eq!(target, 5);
                assert_eq!(available, 5);
            }
            other => panic!("expected OutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_all_gaps_is_out_of_range() {
        assert!(matches!(
            resolve(b"-----", 0),
            Err(ExtractError::OutOfRange { available: 0, .. })
        ));
    }

    #[test]
    fn test_resolve_from_start_rewinds() {
        let resolver = OffsetResolver::new(ScanConfig::default());
        let mut stream = ByteStream::new(Cursor::new(b"AC--GT-A".to_vec()));
        assert_eq!(resolver.resolve_from_start(&mut stream, 3).unwrap(), 5);
        assert_eq!(resolver.resolve_from_start(&mut stream, 2).unwrap(), 4);
    }
}
