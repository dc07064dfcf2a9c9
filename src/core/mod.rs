//! Tile request geometry, pixel normalization and the batch driver

pub mod bbox;
pub mod request;
pub mod normalize;
pub mod batch;

// Re-export main types
pub use bbox::{build_bbox, bbox_to_dimensions, BUFFER_DEG};
pub use request::{ImageRequestSpec, DataCollection, TimeInterval, EVALSCRIPT, TARGET_RESOLUTION_M, TIME_RANGE};
pub use normalize::to_rgb;
pub use batch::{BatchDriver, BatchSummary, run_batch};
