//! Chunked byte streams over aligned sequence files.
//!
//! A [`ByteStream`] reads its underlying resource in fixed-size blocks and
//! re-exposes the content one byte at a time, so peak memory is one block
//! regardless of file size.

use std::fs::File;
use std::io::{self, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use crate::config::DEFAULT_BUFFER_SIZE;
use crate::error::{ExtractError, Result};

/// Sequential, block-buffered reader producing single bytes.
#[derive(Debug)]
pub struct ByteStream<R> {
    inner: R,
    buf: Box<[u8]>,
    /// Cursor into `buf`.
    pos: usize,
    /// Valid bytes in `buf`.
    filled: usize,
    /// Raw offset of `buf[0]` within the resource.
    base: u64,
}

impl ByteStream<File> {
    /// Open a file with the default block size.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_capacity(path, DEFAULT_BUFFER_SIZE)
    }

    /// Open a file reading `buffer_size` bytes per block.
    pub fn open_with_capacity<P: AsRef<Path>>(path: P, buffer_size: usize) -> Result<Self> {
        let file = File::open(path)?;
        Self::with_capacity(file, buffer_size)
    }
}

impl<R: Read> ByteStream<R> {
    /// Wrap a reader with the default block size.
    pub fn new(inner: R) -> Self {
        Self::build(inner, DEFAULT_BUFFER_SIZE)
    }

    /// Wrap a reader reading `buffer_size` bytes per block.
    pub fn with_capacity(inner: R, buffer_size: usize) -> Result<Self> {
        if buffer_size == 0 {
            return Err(ExtractError::usage("buffer size must be > 0"));
        }
        Ok(Self::build(inner, buffer_size))
    }

    fn build(inner: R, buffer_size: usize) -> Self {
        Self {
            inner,
            buf: vec![0u8; buffer_size].into_boxed_slice(),
            pos: 0,
            filled: 0,
            base: 0,
        }
    }

    /// Raw offset of the next byte to be produced.
    pub fn position(&self) -> u64 {
        self.base + self.pos as u64
    }

    /// Lazily produce the remaining bytes.
    ///
    /// The iterator borrows the stream mutably, so the stream cannot be
    /// repositioned while iteration is in progress.
    pub fn bytes(&mut self) -> Bytes<'_, R> {
        Bytes { stream: self }
    }

    /// Read the next byte, refilling the block when exhausted.
    pub fn next_byte(&mut self) -> io::Result<Option<u8>> {
        if self.pos == self.filled {
            self.base += self.filled as u64;
            self.pos = 0;
            self.filled = self.fill()?;
            if self.filled == 0 {
                return Ok(None);
            }
        }
        let byte = self.buf[self.pos];
        self.pos += 1;
        Ok(Some(byte))
    }

    fn fill(&mut self) -> io::Result<usize> {
        loop {
            match self.inner.read(&mut self.buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Unwrap the underlying reader, discarding buffered bytes.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> ByteStream<R> {
    /// Reposition to an absolute raw offset, discarding buffered bytes.
    pub fn seek(&mut self, raw_offset: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(raw_offset))?;
        self.base = raw_offset;
        self.pos = 0;
        self.filled = 0;
        Ok(())
    }

    /// Reposition to raw offset 0.
    pub fn rewind(&mut self) -> Result<()> {
        self.seek(0)
    }
}

/// Iterator over the bytes of a [`ByteStream`].
#[derive(Debug)]
pub struct Bytes<'a, R> {
    stream: &'a mut ByteStream<R>,
}

impl<R: Read> Iterator for Bytes<'_, R> {
    type Item = io::Result<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        self.stream.next_byte().transpose()
    }
}
