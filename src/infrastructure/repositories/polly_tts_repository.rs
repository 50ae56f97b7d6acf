use super::tts_repository::{AudioFragments, TtsRepository};
use async_trait::async_trait;
use aws_sdk_polly::{
    primitives::ByteStream,
    types::{Engine, OutputFormat, VoiceId},
    Client as PollyClient,
};
use futures::{stream, StreamExt};
use std::sync::Arc;

/// AWS Polly rejects requests above this many characters
pub const MAX_REQUEST_CHARS: usize = 3000;

/// AWS Polly implementation of TTS repository
pub struct PollyTtsRepository {
    polly_client: Arc<PollyClient>,
}

impl PollyTtsRepository {
    pub fn new(polly_client: Arc<PollyClient>) -> Self {
        Self { polly_client }
    }

    /// Neural engine where the voice supports it, standard otherwise
    fn engine_for_voice(voice: &str) -> Engine {
        if is_voice_neural_compatible(voice) {
            Engine::Neural
        } else {
            Engine::Standard
        }
    }
}

/// Check if a voice supports neural engine
pub fn is_voice_neural_compatible(voice: &str) -> bool {
    // Based on AWS Polly documentation
    const NEURAL_VOICES: &[&str] = &[
        // English
        "Joanna", "Matthew", "Ivy", "Kendra", "Kimberly", "Salli", "Joey", "Justin", "Kevin",
        "Amy", "Brian", "Emma", "Arthur", "Olivia", "Ruth", "Stephen",
        // Spanish
        "Lupe", "Pedro", "Sergio", // French
        "Lea", "Remi", // German
        "Vicki", "Daniel", // Italian
        "Bianca", "Adriano", // Portuguese
        "Ines", "Camila", "Vitoria", "Thiago",
    ];

    NEURAL_VOICES.contains(&voice)
}

/// Yield Polly's audio body chunk by chunk, in arrival order
fn into_fragments(audio_stream: ByteStream) -> AudioFragments {
    stream::unfold(audio_stream, |mut audio_stream| async move {
        let fragment = audio_stream.next().await?;
        let fragment = fragment
            .map(|bytes| bytes.to_vec())
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to read audio stream from Polly response");
                format!("Failed to read audio stream: {}", e)
            });
        Some((fragment, audio_stream))
    })
    .boxed()
}

#[async_trait]
impl TtsRepository for PollyTtsRepository {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<AudioFragments, String> {
        let voice = VoiceId::from(voice_id);
        let engine = Self::engine_for_voice(voice_id);

        tracing::debug!(
            voice = voice_id,
            engine = ?engine,
            output_format = "Mp3",
            text_length = text.len(),
            text_preview = %text.chars().take(80).collect::<String>(),
            "Calling AWS Polly synthesize_speech"
        );

        if text.chars().count() > MAX_REQUEST_CHARS {
            tracing::warn!(
                text_length = text.len(),
                max_chars = MAX_REQUEST_CHARS,
                "Unit exceeds Polly request limit, request will likely be rejected"
            );
        }

        let result = self
            .polly_client
            .synthesize_speech()
            .text(text)
            .voice_id(voice)
            .output_format(OutputFormat::Mp3)
            .engine(engine.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    error_display = %e,
                    voice_id = voice_id,
                    engine = ?engine,
                    text_length = text.len(),
                    "AWS Polly synthesize_speech failed"
                );
                format!("AWS Polly error: {}", e)
            })?;

        Ok(into_fragments(result.audio_stream))
    }

    fn provider(&self) -> &'static str {
        "polly"
    }
}
