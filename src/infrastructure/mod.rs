pub mod config;
pub mod extraction;
pub mod http;
pub mod notifier;
pub mod repositories;
pub mod sinks;
