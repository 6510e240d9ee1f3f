#![allow(dead_code)]

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use multialign_extract::ByteStream;

/// Write `contents` to `dir/name` and return the path.
pub fn write_aligned(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write aligned file");
    path
}

/// In-memory stream with a deliberately small block size.
pub fn small_block_stream(data: &[u8]) -> ByteStream<Cursor<Vec<u8>>> {
    ByteStream::with_capacity(Cursor::new(data.to_vec()), 3).expect("valid capacity")
}

/// Non-gap bytes of `data`.
pub fn ungapped(data: &[u8]) -> Vec<u8> {
    data.iter().copied().filter(|&b| b != b'-').collect()
}
