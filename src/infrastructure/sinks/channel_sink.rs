use crate::domain::narration::{AudioSink, SinkError, SynthesizedBlob};
use async_trait::async_trait;
use futures::{stream, Stream};
use std::io;
use tokio::sync::mpsc;

/// Item of a live audio stream; an error terminates the transfer
pub type AudioChunk = Result<Vec<u8>, io::Error>;

/// Streaming sink forwarding blobs to a live consumer (e.g. an HTTP body)
pub struct ChannelSink {
    tx: mpsc::Sender<AudioChunk>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<AudioChunk>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl AudioSink for ChannelSink {
    async fn write(&mut self, blob: &SynthesizedBlob) -> Result<(), SinkError> {
        self.tx
            .send(Ok(blob.audio.clone()))
            .await
            .map_err(|_| SinkError::Closed)
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        if self.tx.is_closed() {
            return Err(SinkError::Closed);
        }
        Ok(())
    }

    async fn abort(&mut self, reason: &str) {
        // Surfacing an error makes the consumer see a broken transfer rather
        // than a short but apparently complete one
        let error = io::Error::new(io::ErrorKind::Other, reason.to_string());
        if self.tx.send(Err(error)).await.is_err() {
            tracing::debug!("Stream consumer already gone");
        }
    }
}

/// Adapt the receiving half into a stream suitable for a response body
pub fn audio_stream(rx: mpsc::Receiver<AudioChunk>) -> impl Stream<Item = AudioChunk> + Send + 'static {
    stream::unfold(rx, |mut rx| async move {
        let chunk = rx.recv().await?;
        Some((chunk, rx))
    })
}
