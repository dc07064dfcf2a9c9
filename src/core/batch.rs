use crate::config::RunPaths;
use crate::core::normalize::to_rgb;
use crate::core::request::ImageRequestSpec;
use crate::io::failure_log::FailureLog;
use crate::io::png::ImageSink;
use crate::io::property_reader::PropertyReader;
use crate::io::sentinel_hub::ImageryClient;
use crate::types::{FailureRecord, PropertyRecord, PropertyRow, TileError, TileResult};
use std::path::{Path, PathBuf};

/// Outcome of a whole run
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub saved: Vec<PathBuf>,
    pub failures: Vec<FailureRecord>,
    /// Set when at least one row failed and the log was written
    pub failure_log: Option<PathBuf>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Final line reported to the user
    pub fn summary_line(&self) -> String {
        if self.failures.is_empty() {
            return "All images downloaded successfully.".to_string();
        }

        match &self.failure_log {
            Some(path) => format!(
                "Finished with {} failures. Logged to {}",
                self.failures.len(),
                path.display()
            ),
            None => format!("Finished with {} failures.", self.failures.len()),
        }
    }
}

/// Sequential fetch-and-save loop over property rows.
///
/// Each row is isolated: any error while fetching or saving one tile turns
/// into a [`FailureRecord`] and the loop moves on.
pub struct BatchDriver<'a, C: ImageryClient, S: ImageSink> {
    client: &'a mut C,
    sink: &'a S,
    images_dir: PathBuf,
}

impl<'a, C: ImageryClient, S: ImageSink> BatchDriver<'a, C, S> {
    pub fn new(client: &'a mut C, sink: &'a S, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            sink,
            images_dir: images_dir.into(),
        }
    }

    /// Fetch one property's tile and write it under the images directory
    pub fn fetch_and_save_image(&mut self, record: &PropertyRecord) -> TileResult<PathBuf> {
        let spec = ImageRequestSpec::for_property(record)?;
        log::debug!("id={} -> bbox {:?}, {}x{} px", record.id, spec.bbox.as_array(), spec.size.0, spec.size.1);

        let pixels = self.client.fetch(&spec)?.ok_or(TileError::EmptyResponse)?;
        let rgb = to_rgb(pixels)?;

        let out_path = self.images_dir.join(record.image_filename());
        self.sink.save(&rgb, &out_path)?;
        Ok(out_path)
    }

    fn process_row(&mut self, row: &PropertyRow) -> TileResult<PathBuf> {
        let record = PropertyRecord::try_from(row)?;
        self.fetch_and_save_image(&record)
    }

    /// Process every row in order, printing one progress line per row
    pub fn run(&mut self, rows: &[PropertyRow]) -> BatchSummary {
        let total = rows.len();
        let mut summary = BatchSummary {
            total,
            ..Default::default()
        };

        for (idx, row) in rows.iter().enumerate() {
            let position = idx + 1;
            match self.process_row(row) {
                Ok(path) => {
                    println!("✅ [{}/{}] Saved {}", position, total, file_name(&path));
                    summary.saved.push(path);
                }
                Err(e) => {
                    eprintln!("❌ [{}/{}] Failed for id={}: {}", position, total, row.id, e);
                    log::debug!("Row {} failure detail: {:?}", position, e);
                    summary.failures.push(FailureRecord {
                        id: row.id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        summary
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Run the full download job described by `paths`.
///
/// Missing input, missing columns, or an unwritable failure log abort the
/// run with an error. Per-row problems never do.
pub fn run_batch<C, S>(paths: &RunPaths, client: &mut C, sink: &S) -> TileResult<BatchSummary>
where
    C: ImageryClient,
    S: ImageSink,
{
    let rows = PropertyReader::read_rows(&paths.input_csv)?;
    std::fs::create_dir_all(&paths.images_dir)?;

    println!("Starting download for {} properties...", rows.len());

    let mut driver = BatchDriver::new(client, sink, &paths.images_dir);
    let mut summary = driver.run(&rows);

    if !summary.failures.is_empty() {
        FailureLog::write(&paths.failure_log, &summary.failures)?;
        summary.failure_log = Some(paths.failure_log.clone());
    }

    println!("\n{}", summary.summary_line());
    Ok(summary)
}
