use super::model::SynthesizedBlob;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The consumer went away (e.g. a streaming client disconnected)
    #[error("consumer closed the output")]
    Closed,
    #[error("write failed: {0}")]
    Write(String),
}

/// Destination for assembled audio.
///
/// Receives blobs strictly in sequence order. `finish` is called once after
/// the last blob; `abort` is called instead when the traversal fails, and must
/// leave no output that could be mistaken for a complete narration.
#[async_trait]
pub trait AudioSink: Send {
    async fn write(&mut self, blob: &SynthesizedBlob) -> Result<(), SinkError>;

    async fn finish(&mut self) -> Result<(), SinkError>;

    async fn abort(&mut self, reason: &str);
}

/// Collects audio in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    audio: Vec<u8>,
    sequences: Vec<u64>,
    finished: bool,
    aborted: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn audio(&self) -> &[u8] {
        &self.audio
    }

    /// Sequences in the order they were written
    pub fn sequences(&self) -> &[u64] {
        &self.sequences
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

#[async_trait]
impl AudioSink for MemorySink {
    async fn write(&mut self, blob: &SynthesizedBlob) -> Result<(), SinkError> {
        self.audio.extend_from_slice(&blob.audio);
        self.sequences.push(blob.sequence);
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        self.finished = true;
        Ok(())
    }

    async fn abort(&mut self, _reason: &str) {
        self.audio.clear();
        self.aborted = true;
    }
}
