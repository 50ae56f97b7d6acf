use crate::domain::narration::{AudioSink, SinkError, SynthesizedBlob};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Durable sink writing to `<path>.part`, renamed to `<path>` once finished.
///
/// An aborted sink removes its partial file, so `<path>` only ever holds a
/// complete narration.
pub struct FileSink {
    path: PathBuf,
    part_path: PathBuf,
    file: Option<File>,
    bytes_written: u64,
}

impl FileSink {
    pub async fn create(path: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let path = path.into();
        let mut part_path = path.clone().into_os_string();
        part_path.push(".part");
        let part_path = PathBuf::from(part_path);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SinkError::Write(format!("Failed to create {}: {}", parent.display(), e)))?;
        }

        let file = File::create(&part_path)
            .await
            .map_err(|e| SinkError::Write(format!("Failed to create {}: {}", part_path.display(), e)))?;

        Ok(Self {
            path,
            part_path,
            file: Some(file),
            bytes_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

#[async_trait]
impl AudioSink for FileSink {
    async fn write(&mut self, blob: &SynthesizedBlob) -> Result<(), SinkError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| SinkError::Write("file sink already closed".to_string()))?;

        file.write_all(&blob.audio)
            .await
            .map_err(|e| SinkError::Write(format!("Failed to write unit {}: {}", blob.sequence, e)))?;
        self.bytes_written += blob.audio.len() as u64;
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        let mut file = self
            .file
            .take()
            .ok_or_else(|| SinkError::Write("file sink already closed".to_string()))?;

        file.flush()
            .await
            .map_err(|e| SinkError::Write(format!("Failed to flush audio: {}", e)))?;
        file.sync_all()
            .await
            .map_err(|e| SinkError::Write(format!("Failed to sync audio: {}", e)))?;
        drop(file);

        tokio::fs::rename(&self.part_path, &self.path)
            .await
            .map_err(|e| SinkError::Write(format!("Failed to publish {}: {}", self.path.display(), e)))?;

        tracing::info!(
            path = %self.path.display(),
            audio_size_bytes = self.bytes_written,
            "Audio file written"
        );
        Ok(())
    }

    async fn abort(&mut self, reason: &str) {
        self.file.take();

        match tokio::fs::remove_file(&self.part_path).await {
            Ok(()) => tracing::warn!(
                path = %self.part_path.display(),
                reason,
                "Discarded partial audio file"
            ),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::error!(
                path = %self.part_path.display(),
                error = %e,
                "Failed to remove partial audio file"
            ),
        }
    }
}
