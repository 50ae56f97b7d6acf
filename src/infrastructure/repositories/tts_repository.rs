use async_trait::async_trait;
use futures::stream::BoxStream;

/// Audio fragments of a single synthesis call, in the order they arrive
pub type AudioFragments = BoxStream<'static, Result<Vec<u8>, String>>;

/// Repository for TTS synthesis operations.
/// Abstracts the underlying TTS provider (AWS Polly, OpenAI, etc.)
///
/// Implementations make exactly one remote call per invocation. Splitting text
/// into provider-sized units and merging the results happens upstream.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize one unit of text with the given voice
    ///
    /// Returns the audio as a stream of fragments (MP3 format). Fragments must be
    /// concatenated in the order they are yielded.
    ///
    /// # Errors
    /// Returns error if the provider rejects the request or is unavailable
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<AudioFragments, String>;

    /// Provider name used in logs and health output
    fn provider(&self) -> &'static str;
}
