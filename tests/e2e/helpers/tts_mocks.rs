use async_trait::async_trait;
use futures::{stream, StreamExt};
use parking_lot::Mutex;
use sonify_backend::infrastructure::notifier::{Delivery, DeliveryNotifier};
use sonify_backend::infrastructure::repositories::{AudioFragments, TtsRepository};
use std::time::Duration;

/// Text containing this marker fails to synthesize
pub const FAIL_MARKER: &str = "FAIL";
/// Text containing this marker is synthesized slowly
pub const SLOW_MARKER: &str = "slow";

/// Fake speech synthesis: the audio for a unit is `<text>`, split in two fragments
#[derive(Default)]
pub struct ScriptedTtsRepository {
    calls: Mutex<Vec<String>>,
}

impl ScriptedTtsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl TtsRepository for ScriptedTtsRepository {
    async fn synthesize(&self, text: &str, _voice_id: &str) -> Result<AudioFragments, String> {
        self.calls.lock().push(text.to_string());

        if text.contains(SLOW_MARKER) {
            tokio::time::sleep(Duration::from_millis(80)).await;
        }
        if text.contains(FAIL_MARKER) {
            return Err("scripted provider failure".to_string());
        }

        let fragments = vec![Ok(b"<".to_vec()), Ok(format!("{}>", text).into_bytes())];
        Ok(stream::iter(fragments).boxed())
    }

    fn provider(&self) -> &'static str {
        "scripted"
    }
}

/// Notifier that keeps every delivery for later inspection
#[derive(Default)]
pub struct RecordingNotifier {
    deliveries: Mutex<Vec<Delivery>>,
}

impl RecordingNotifier {
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().clone()
    }
}

#[async_trait]
impl DeliveryNotifier for RecordingNotifier {
    async fn deliver(&self, delivery: &Delivery) -> Result<(), String> {
        self.deliveries.lock().push(delivery.clone());
        Ok(())
    }
}
