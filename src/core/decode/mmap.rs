//! Memory-mapped file I/O for handing large images to the engine.
//!
//! The engine itself only sees byte slices; this is used by callers
//! (the CLI) that start from paths. Files of 1MB and more are mapped,
//! smaller files are read into memory.

use crate::error::PhotoVisionError;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Minimum file size to use memory-mapped I/O (1MB)
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// Read file bytes, memory-mapping large files.
pub fn read_file_bytes(path: &Path) -> Result<FileBytes, PhotoVisionError> {
    let metadata = std::fs::metadata(path).map_err(|e| io_error(path, e))?;

    if metadata.len() >= MMAP_THRESHOLD {
        read_mmap(path)
    } else {
        read_standard(path)
    }
}

fn read_mmap(path: &Path) -> Result<FileBytes, PhotoVisionError> {
    let file = File::open(path).map_err(|e| io_error(path, e))?;

    // SAFETY: We're only reading the file, and we hold the file handle
    // for the lifetime of the mmap.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| io_error(path, e))?;

    Ok(FileBytes::Mmap(mmap))
}

fn read_standard(path: &Path) -> Result<FileBytes, PhotoVisionError> {
    let bytes = std::fs::read(path).map_err(|e| io_error(path, e))?;
    Ok(FileBytes::Vec(bytes))
}

fn io_error(path: &Path, source: std::io::Error) -> PhotoVisionError {
    PhotoVisionError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// File bytes that may be either owned or memory-mapped.
#[derive(Debug)]
pub enum FileBytes {
    /// Standard heap-allocated bytes
    Vec(Vec<u8>),
    /// Memory-mapped bytes (zero-copy from disk)
    Mmap(Mmap),
}

impl AsRef<[u8]> for FileBytes {
    fn as_ref(&self) -> &[u8] {
        match self {
            FileBytes::Vec(v) => v,
            FileBytes::Mmap(m) => m,
        }
    }
}

impl std::ops::Deref for FileBytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_ref()
    }
}
