//! SHA-256 checksums for exported artifacts
//!
//! Downloads are hashed while they stream to disk so the tracker can record a
//! checksum without re-reading the file; [`checksum_file`] recomputes it
//! later for verification.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Calculate SHA-256 checksum of raw bytes
///
/// Returns a hex-encoded SHA-256 checksum string (64 characters).
///
/// # Examples
///
/// ```
/// use sierra_export::core::verification::checksum::calculate_checksum_bytes;
///
/// let checksum = calculate_checksum_bytes(b"{\"outputRecords\": 0}");
/// assert_eq!(checksum.len(), 64);
/// ```
pub fn calculate_checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Incremental hasher that also counts bytes
#[derive(Clone, Default)]
pub struct StreamingChecksum {
    hasher: Sha256,
    bytes: u64,
}

impl std::fmt::Debug for StreamingChecksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingChecksum")
            .field("bytes", &self.bytes)
            .finish_non_exhaustive()
    }
}

impl StreamingChecksum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk
    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
        self.bytes += chunk.len() as u64;
    }

    /// Bytes seen so far
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Consume the hasher, returning `(bytes, hex_sha256)`
    pub fn finish(self) -> (u64, String) {
        (self.bytes, format!("{:x}", self.hasher.finalize()))
    }
}

/// Recompute the checksum of a file on disk
pub fn checksum_file(path: &Path) -> io::Result<(u64, String)> {
    let mut file = File::open(path)?;
    let mut checksum = StreamingChecksum::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        checksum.update(&buf[..n]);
    }
    Ok(checksum.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_calculate_checksum_bytes_known_value() {
        assert_eq!(
            calculate_checksum_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let data = b"00714cam  2200205 a 4500001001300000";
        let mut streaming = StreamingChecksum::new();
        for chunk in data.chunks(7) {
            streaming.update(chunk);
        }
        let (bytes, sha) = streaming.finish();
        assert_eq!(bytes, data.len() as u64);
        assert_eq!(sha, calculate_checksum_bytes(data));
    }

    #[test]
    fn test_checksum_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"record data").unwrap();
        file.flush().unwrap();

        let (bytes, sha) = checksum_file(file.path()).unwrap();
        assert_eq!(bytes, 11);
        assert_eq!(sha, calculate_checksum_bytes(b"record data"));
    }

    #[test]
    fn test_checksum_missing_file() {
        assert!(checksum_file(Path::new("/nonexistent/artifact.mrc")).is_err());
    }
}
