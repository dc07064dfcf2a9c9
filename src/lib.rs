//! skyparcel: Sentinel-2 true-color tiles for property coordinates
//!
//! Reads a table of property locations, requests a 5 m/pixel true-color tile
//! around each one from the Sentinel Hub Process API, and writes the tiles as
//! PNG files. Rows that fail are collected into a CSV log instead of stopping
//! the run.

pub mod types;
pub mod config;
pub mod io;
pub mod core;

// Re-export main types and functions for easier access
pub use types::{
    BoundingBox, Crs, PropertyRecord, PropertyRow, PixelData, FailureRecord, TileError, TileResult,
};
pub use config::{Credentials, RunPaths, SentinelHubConfig};
pub use io::{ImageryClient, ImageSink, PngWriter, SentinelHubClient};
pub use crate::core::{run_batch, BatchSummary};
