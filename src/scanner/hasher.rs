//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! [`Hasher`] computes a 256-bit BLAKE3 digest over the entire contents of a
//! file. Files are read through a fixed-size buffer, so memory use does not
//! depend on file size. Partial hashing is never used: a digest always covers
//! every byte.
//!
//! # Example
//!
//! ```no_run
//! use dupsort::scanner::{hash_to_hex, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let digest = hasher.full_hash(Path::new("some_file.bin")).unwrap();
//! println!("{}", hash_to_hex(&digest));
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::HashError;

/// A 32-byte BLAKE3 digest.
pub type Hash = [u8; 32];

/// Default read buffer size (64 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Streaming whole-file hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    buffer_size: usize,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            shutdown_flag: None,
        }
    }

    /// Set the read buffer size (minimum 1 byte).
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Set the shutdown flag checked between chunks.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Current read buffer size.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Compute the BLAKE3 digest of the whole file.
    ///
    /// # Errors
    ///
    /// - [`HashError::NotFound`] / [`HashError::PermissionDenied`] if the file
    ///   cannot be opened
    /// - [`HashError::Io`] if a read fails mid-stream
    /// - [`HashError::Interrupted`] if shutdown was requested while reading
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.buffer_size];

        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted(path.to_path_buf()));
            }
            let read = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            };
            hasher.update(&buffer[..read]);
        }

        Ok(*hasher.finalize().as_bytes())
    }

    /// Compare two files byte for byte.
    ///
    /// Returns `Ok(false)` as soon as a difference (content or length) is
    /// found.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] for whichever file could not be read.
    pub fn files_identical(&self, a: &Path, b: &Path) -> Result<bool, HashError> {
        let mut file_a = File::open(a).map_err(|e| HashError::from_io(a, e))?;
        let mut file_b = File::open(b).map_err(|e| HashError::from_io(b, e))?;
        let mut buf_a = vec![0u8; self.buffer_size];
        let mut buf_b = vec![0u8; self.buffer_size];

        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted(a.to_path_buf()));
            }
            let read_a = fill(&mut file_a, &mut buf_a).map_err(|e| HashError::from_io(a, e))?;
            let read_b = fill(&mut file_b, &mut buf_b).map_err(|e| HashError::from_io(b, e))?;

            if read_a != read_b || buf_a[..read_a] != buf_b[..read_b] {
                return Ok(false);
            }
            if read_a == 0 {
                return Ok(true);
            }
        }
    }
}

/// Read until the buffer is full or EOF, returning the number of bytes read.
fn fill(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Encode a digest as lowercase hexadecimal (64 characters).
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    blake3::Hash::from(*hash).to_hex().to_string()
}

/// Decode a 64-character hexadecimal string into a digest.
#[must_use]
pub fn hex_to_hash(hex: &str) -> Option<Hash> {
    blake3::Hash::from_hex(hex).ok().map(|h| *h.as_bytes())
}
