//! Scan configuration shared by every stream pass.

use crate::error::{ExtractError, Result};

/// Gap placeholder written by the alignment tools.
pub const DEFAULT_GAP: u8 = b'-';

/// Default block size for chunked reads.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Parameters controlling how aligned streams are scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// The single reserved gap byte.
    pub gap: u8,
    /// Bytes read from the underlying resource per block.
    pub buffer_size: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            gap: DEFAULT_GAP,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl ScanConfig {
    /// Set the gap byte.
    pub fn with_gap(mut self, gap: u8) -> Self {
        self.gap = gap;
        self
    }

    /// Set the read block size; must be > 0.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Result<Self> {
        if buffer_size == 0 {
            return Err(ExtractError::usage("buffer size must be > 0"));
        }
        self.buffer_size = buffer_size;
        Ok(self)
    }

    /// Returns `true` when `byte` is the configured gap.
    #[inline]
    pub fn is_gap(&self, byte: u8) -> bool {
        byte == self.gap
    }
}
