use std::io::{Read, Write};

use tracing::{debug, warn};

use super::extractor::Extraction;
use super::{RawOffset, UngappedOffset};
use crate::config::ScanConfig;
use crate::error::{ExtractError, Result};
use crate::stream::ByteStream;

/// Result of a fused resolve-and-extract pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatedExtraction {
    /// Raw offset at which emission started.
    pub raw_offset: RawOffset,
    /// Extraction statistics, counted from `raw_offset`.
    pub extraction: Extraction,
}

#[derive(Debug, Clone, Copy)]
enum ScanState {
    /// Counting non-gap bytes until the target is reached.
    Seeking { ungapped: u64 },
    /// Emitting non-gap bytes.
    Emitting { raw_offset: RawOffset, emitted: u64 },
}

/// Resolve `target` and extract `length` gap-stripped characters in one
/// forward pass over the stream.
///
/// Emission begins at the first non-gap byte whose ungapped index equals
/// `target`. A target past the end fails with
/// [`ExtractError::OutOfRange`]; running out of input after emission began
/// is a short read.
pub fn resolve_and_extract<R: Read, W: Write>(
    config: &ScanConfig,
    stream: &mut ByteStream<R>,
    target: UngappedOffset,
    length: u64,
    sink: &mut W,
) -> Result<LocatedExtraction> {
    let mut state = ScanState::Seeking { ungapped: 0 };
    let mut raw = stream.position();

    loop {
        if let ScanState::Emitting { emitted, .. } = state {
            if emitted == length {
                break;
            }
        }
        let Some(byte) = stream.next_byte()? else {
            break;
        };
        if !config.is_gap(byte) {
            state = match state {
                ScanState::Seeking { ungapped } if ungapped == target => {
                    debug!(target_offset = target, raw_offset = raw, "resolved ungapped offset");
                    if length == 0 {
                        ScanState::Emitting { raw_offset: raw, emitted: 0 }
                    } else {
                        sink.write_all(&[byte])?;
                        ScanState::Emitting { raw_offset: raw, emitted: 1 }
                    }
                }
                ScanState::Seeking { ungapped } => ScanState::Seeking {
                    ungapped: ungapped + 1,
                },
                ScanState::Emitting { raw_offset, emitted } => {
                    sink.write_all(&[byte])?;
                    ScanState::Emitting {
                        raw_offset,
                        emitted: emitted + 1,
                    }
                }
            };
        }
        raw += 1;
    }

    match state {
        ScanState::Seeking { ungapped } => Err(ExtractError::OutOfRange {
            target,
            available: ungapped,
        }),
        ScanState::Emitting { raw_offset, emitted } => {
            let extraction = Extraction {
                requested: length,
                emitted,
                consumed: stream.position() - raw_offset,
            };
            if extraction.is_short() {
                warn!(
                    requested = length,
                    emitted,
                    raw_offset,
                    "stream exhausted before the requested length was extracted"
                );
            }
            Ok(LocatedExtraction {
                raw_offset,
                extraction,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(data: &[u8], target: u64, length: u64) -> Result<(Vec<u8>, LocatedExtraction)> {
        let config = ScanConfig::default();
        let mut stream = ByteStream::with_capacity(Cursor::new(data.to_vec()), 2)?;
        let mut out = Vec::new();
        let located = resolve_and_extract(&config, &mut stream, target, length, &mut out)?;
        Ok((out, located))
    }

    #[test]
    fn test_fused_matches_example() {
        let (out, located) = run(b"AC--GT-A", 2, 2).unwrap();
        assert_eq!(out, b"GT");
        assert_eq!(located.raw_offset, 4);
        assert_eq!(located.extraction.consumed, 2);
        assert!(!located.extraction.is_short());
    }

    #[test]
    fn test_fused_skips_interior_gaps() {
        let (out, located) = run(b"AC--GT-A", 1, 4).unwrap();
        assert_eq!(out, b"CGTA");
        assert_eq!(located.raw_offset, 1);
        assert_eq!(located.extraction.consumed, 7);
    }

    #[test]
    fn test_fused_short_read() {
        let (out, located) = run(b"AC--GT-A", 3, 5).unwrap();
        assert_eq!(out, b"TA");
        assert_eq!(located.raw_offset, 5);
        assert!(located.extraction.is_short());
    }

    #[test]
    fn test_fused_out_of_range() {
        assert!(matches!(
            run(b"AC--GT-A", 5, 1),
            Err(ExtractError::OutOfRange { target: 5, available: 5 })
        ));
    }
}
