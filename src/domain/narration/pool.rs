use super::error::NarrationError;
use super::model::{SynthesizedBlob, Unit};
use crate::infrastructure::repositories::TtsRepository;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch, Semaphore};

pub type SynthesisResult = Result<SynthesizedBlob, NarrationError>;

/// Fixed-capacity pool turning units into audio through the TTS provider.
///
/// At most `concurrency` units are in flight at once, and a unit is only
/// dispatched once it falls within `window` sequences of the consumer's
/// progress, which bounds how much audio can wait for reordering.
pub struct SynthesisPool {
    tts_repo: Arc<dyn TtsRepository>,
    voice_id: Arc<str>,
    permits: Arc<Semaphore>,
    concurrency: usize,
    window: u64,
}

impl SynthesisPool {
    pub fn new(tts_repo: Arc<dyn TtsRepository>, voice_id: impl Into<Arc<str>>, concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            tts_repo,
            voice_id: voice_id.into(),
            permits: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            window: 2 * concurrency as u64,
        }
    }

    /// Override the reorder window; never narrower than the concurrency
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window.max(self.concurrency) as u64;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn window(&self) -> u64 {
        self.window
    }

    /// Permits not currently held by a worker
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Dispatch `units` in submission order and stream back one result per unit.
    ///
    /// The consumer reports its progress with [`SynthesisStream::advance`];
    /// sequence `s` is held back until `s < next_expected + window`.
    /// Dropping the stream stops dispatching further units, and workers still
    /// waiting on the provider abandon their call. Every worker releases its
    /// permit when it exits, whatever the outcome.
    pub fn synthesize_all(&self, units: Vec<Unit>) -> SynthesisStream {
        let (tx, rx) = mpsc::channel(self.concurrency);
        let (progress_tx, mut progress) = watch::channel(0u64);
        let tts_repo = self.tts_repo.clone();
        let voice_id = self.voice_id.clone();
        let permits = self.permits.clone();
        let window = self.window;

        tokio::spawn(async move {
            for unit in units {
                let in_window = tokio::select! {
                    biased;
                    _ = tx.closed() => false,
                    in_window = wait_for_window(&mut progress, unit.sequence, window) => in_window,
                };
                if !in_window {
                    tracing::debug!(
                        next_sequence = unit.sequence,
                        "Result receiver dropped, stopping dispatch"
                    );
                    break;
                }

                let permit = tokio::select! {
                    biased;
                    _ = tx.closed() => {
                        tracing::debug!(
                            next_sequence = unit.sequence,
                            "Result receiver dropped, stopping dispatch"
                        );
                        break;
                    }
                    permit = permits.clone().acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => break,
                    },
                };

                let tx = tx.clone();
                let tts_repo = tts_repo.clone();
                let voice_id = voice_id.clone();

                tokio::spawn(async move {
                    let _permit = permit;
                    let sequence = unit.sequence;

                    tokio::select! {
                        biased;
                        _ = tx.closed() => {
                            tracing::debug!(sequence, "Result receiver dropped, abandoning synthesis");
                        }
                        result = synthesize_unit(tts_repo.as_ref(), &voice_id, unit) => {
                            if tx.send(result).await.is_err() {
                                tracing::debug!(sequence, "Result receiver dropped before delivery");
                            }
                        }
                    }
                });
            }
        });

        SynthesisStream {
            results: rx,
            progress: progress_tx,
        }
    }
}

/// Results of one [`SynthesisPool::synthesize_all`] run, in completion order
pub struct SynthesisStream {
    results: mpsc::Receiver<SynthesisResult>,
    progress: watch::Sender<u64>,
}

impl SynthesisStream {
    pub async fn recv(&mut self) -> Option<SynthesisResult> {
        self.results.recv().await
    }

    /// Report the next sequence the consumer is waiting for
    pub fn advance(&self, next_expected: u64) {
        self.progress.send_if_modified(|current| {
            if next_expected > *current {
                *current = next_expected;
                true
            } else {
                false
            }
        });
    }
}

/// Wait until `sequence` is inside the window; false once the consumer is gone
async fn wait_for_window(progress: &mut watch::Receiver<u64>, sequence: u64, window: u64) -> bool {
    loop {
        if sequence < progress.borrow_and_update().saturating_add(window) {
            return true;
        }
        if progress.changed().await.is_err() {
            return false;
        }
    }
}

/// One remote call: send the unit's text, concatenate fragments in arrival order
async fn synthesize_unit(tts_repo: &dyn TtsRepository, voice_id: &str, unit: Unit) -> SynthesisResult {
    let start_time = Instant::now();
    let sequence = unit.sequence;

    tracing::debug!(
        sequence,
        provider = tts_repo.provider(),
        text_length = unit.text.len(),
        "Dispatching unit"
    );

    let mut fragments = tts_repo
        .synthesize(&unit.text, voice_id)
        .await
        .map_err(|reason| NarrationError::Synthesis { sequence, reason })?;

    let mut audio = Vec::new();
    let mut fragment_count = 0usize;
    while let Some(fragment) = fragments.next().await {
        let fragment = fragment.map_err(|reason| NarrationError::Synthesis { sequence, reason })?;
        audio.extend_from_slice(&fragment);
        fragment_count += 1;
    }

    if audio.is_empty() {
        tracing::error!(sequence, "Provider returned no audio");
        return Err(NarrationError::Synthesis {
            sequence,
            reason: "provider returned no audio".to_string(),
        });
    }

    tracing::info!(
        sequence,
        fragment_count,
        audio_size_bytes = audio.len(),
        latency_ms = start_time.elapsed().as_millis(),
        "Unit synthesized"
    );

    Ok(SynthesizedBlob { sequence, audio })
}
