use crate::types::{FailureRecord, TileResult};
use std::path::Path;

/// CSV log of rows that produced no image
pub struct FailureLog;

impl FailureLog {
    /// Write `failures` to `path` with an `id,error` header, replacing any previous log.
    ///
    /// The parent directory is created if needed.
    pub fn write<P: AsRef<Path>>(path: P, failures: &[FailureRecord]) -> TileResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(path)?;
        for failure in failures {
            writer.serialize(failure)?;
        }
        writer.flush()?;

        log::info!("Wrote {} failure records to {}", failures.len(), path.display());
        Ok(())
    }
}
