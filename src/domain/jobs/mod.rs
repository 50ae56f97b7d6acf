pub mod error;
pub mod model;
pub mod registry;
pub mod service;

pub use error::JobServiceError;
pub use model::{JobRecord, JobStatus};
pub use registry::JobRegistry;
pub use service::{NarrationJobService, NarrationJobServiceApi, StoredAudio};
