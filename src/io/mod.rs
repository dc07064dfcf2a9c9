//! I/O modules for property tables, failure logs, PNG tiles and the imagery service

pub mod property_reader;
pub mod failure_log;
pub mod png;
pub mod sentinel_hub;

pub use property_reader::PropertyReader;
pub use failure_log::FailureLog;
pub use png::{ImageSink, PngWriter};
pub use sentinel_hub::{ImageryClient, SentinelHubClient};
