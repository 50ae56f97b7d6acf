pub mod assembler;
pub mod classifier;
pub mod error;
pub mod model;
pub mod normalizer;
pub mod pool;
pub mod segmenter;
pub mod service;
pub mod sink;

pub use assembler::Assembler;
pub use classifier::BoundaryClassifier;
pub use error::NarrationError;
pub use model::{Document, NarrationReport, Page, PipelineState, SynthesizedBlob, Unit};
pub use pool::{SynthesisPool, SynthesisStream};
pub use service::{ContentStartPolicy, NarrationService, NarrationServiceApi, NarrationSettings};
pub use sink::{AudioSink, MemorySink, SinkError};
