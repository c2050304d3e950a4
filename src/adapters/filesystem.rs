//! Local artifact storage
//!
//! Every artifact is written to `<name>.part` inside the download directory
//! and renamed into place only once it is complete, so a crash or a failed
//! download never leaves a truncated file under the final name. The SHA-256
//! and byte count are computed while writing.

use crate::core::verification::checksum::StreamingChecksum;
use crate::domain::{RangeId, Result, SierraExportError};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

/// A completed artifact
#[derive(Debug, Clone, PartialEq)]
pub struct StoredArtifact {
    /// File name relative to the download directory
    pub file_name: String,
    pub path: PathBuf,
    pub bytes: u64,
    pub sha256: String,
}

/// Download directory plus artifact naming
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    file_prefix: String,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>, file_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_prefix: file_prefix.into(),
        }
    }

    /// `{prefix}_{start}_{end}.mrc`
    pub fn marc_file_name(&self, start: RangeId, end: RangeId) -> String {
        format!("{}_{}_{}.mrc", self.file_prefix, start, end)
    }

    /// `{prefix}_{start}_{end}_empty.json`
    pub fn empty_file_name(&self, start: RangeId, end: RangeId) -> String {
        format!("{}_{}_{}_empty.json", self.file_prefix, start, end)
    }

    /// Open `<file_name>.part` for writing
    pub async fn begin(&self, file_name: &str) -> Result<PartialArtifact> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| write_error(&self.dir, &e))?;

        let final_path = self.dir.join(file_name);
        let part_path = self.dir.join(format!("{file_name}.part"));
        let file = File::create(&part_path)
            .await
            .map_err(|e| write_error(&part_path, &e))?;

        Ok(PartialArtifact {
            file_name: file_name.to_string(),
            final_path,
            part_path,
            file: Some(file),
            checksum: StreamingChecksum::new(),
            committed: false,
        })
    }

    /// Write a complete artifact in one go
    pub async fn write_all(&self, file_name: &str, contents: &[u8]) -> Result<StoredArtifact> {
        let mut part = self.begin(file_name).await?;
        part.write_chunk(contents).await?;
        part.commit().await
    }
}

/// An artifact being written
///
/// Dropping it before [`commit`](Self::commit) succeeds removes the `.part` file.
#[derive(Debug)]
pub struct PartialArtifact {
    file_name: String,
    final_path: PathBuf,
    part_path: PathBuf,
    file: Option<File>,
    checksum: StreamingChecksum,
    committed: bool,
}

impl PartialArtifact {
    /// Append the next chunk
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        let file = self.file.as_mut().ok_or_else(|| {
            SierraExportError::Download(format!(
                "artifact {} already closed",
                self.part_path.display()
            ))
        })?;
        file.write_all(chunk)
            .await
            .map_err(|e| write_error(&self.part_path, &e))?;
        self.checksum.update(chunk);
        Ok(())
    }

    /// Bytes written so far
    pub fn bytes_written(&self) -> u64 {
        self.checksum.bytes()
    }

    /// Flush, fsync and rename into place
    pub async fn commit(mut self) -> Result<StoredArtifact> {
        if let Some(mut file) = self.file.take() {
            file.flush()
                .await
                .map_err(|e| write_error(&self.part_path, &e))?;
            file.sync_all()
                .await
                .map_err(|e| write_error(&self.part_path, &e))?;
        }

        fs::rename(&self.part_path, &self.final_path)
            .await
            .map_err(|e| write_error(&self.final_path, &e))?;
        self.committed = true;

        let (bytes, sha256) = std::mem::take(&mut self.checksum).finish();
        tracing::debug!(
            path = %self.final_path.display(),
            bytes = bytes,
            "Artifact written"
        );

        Ok(StoredArtifact {
            file_name: std::mem::take(&mut self.file_name),
            path: self.final_path.clone(),
            bytes,
            sha256,
        })
    }
}

impl Drop for PartialArtifact {
    fn drop(&mut self) {
        if !self.committed {
            // Close before removing
            drop(self.file.take());
            if let Err(e) = std::fs::remove_file(&self.part_path) {
                tracing::warn!(
                    path = %self.part_path.display(),
                    error = %e,
                    "Failed to remove partial artifact"
                );
            } else {
                tracing::debug!(path = %self.part_path.display(), "Removed partial artifact");
            }
        }
    }
}

fn write_error(path: &Path, e: &std::io::Error) -> SierraExportError {
    SierraExportError::Download(format!("failed writing {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::verification::checksum::calculate_checksum_bytes;
    use tempfile::TempDir;

    #[test]
    fn test_artifact_names() {
        let store = ArtifactStore::new("/srv/marc", "sierra_export");
        let (s, e) = (RangeId::new(1_000_000), RangeId::new(1_000_049));
        assert_eq!(store.marc_file_name(s, e), "sierra_export_1000000_1000049.mrc");
        assert_eq!(
            store.empty_file_name(s, e),
            "sierra_export_1000000_1000049_empty.json"
        );
    }

    #[tokio::test]
    async fn test_write_all_is_atomic_and_checksummed() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path().join("out"), "p");

        let stored = store.write_all("a.json", b"{\"outputRecords\":0}").await.unwrap();

        assert_eq!(stored.bytes, 19);
        assert_eq!(stored.sha256, calculate_checksum_bytes(b"{\"outputRecords\":0}"));
        assert!(stored.path.exists());
        assert!(!dir.path().join("out/a.json.part").exists());
    }

    #[tokio::test]
    async fn test_dropped_partial_is_removed() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path(), "p");

        let mut part = store.begin("b.mrc").await.unwrap();
        part.write_chunk(b"partial").await.unwrap();
        assert_eq!(part.bytes_written(), 7);
        assert!(dir.path().join("b.mrc.part").exists());
        drop(part);

        assert!(!dir.path().join("b.mrc.part").exists());
        assert!(!dir.path().join("b.mrc").exists());
    }

    #[tokio::test]
    async fn test_failed_rename_removes_partial() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("x.mrc/occupied")).unwrap();
        let store = ArtifactStore::new(dir.path(), "p");

        let err = store.write_all("x.mrc", b"data").await.unwrap_err();

        assert!(matches!(err, SierraExportError::Download(_)));
        assert!(!dir.path().join("x.mrc.part").exists());
        assert!(dir.path().join("x.mrc/occupied").is_dir());
    }
}
