pub mod channel_sink;
pub mod file_sink;

pub use channel_sink::{audio_stream, AudioChunk, ChannelSink};
pub use file_sink::FileSink;
