pub mod jobs;
pub mod narration;
