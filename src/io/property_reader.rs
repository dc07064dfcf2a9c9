use crate::types::{PropertyRow, TileError, TileResult};
use std::path::Path;

/// Columns every input file must carry
pub const REQUIRED_COLUMNS: [&str; 3] = ["id", "lat", "long"];

/// Reader for the property coordinate table
pub struct PropertyReader;

impl PropertyReader {
    /// Read every row of the input CSV as raw text.
    ///
    /// Fails before returning any row if the file is missing or lacks one of
    /// the `id`, `lat`, `long` columns. Extra columns are ignored; short rows
    /// yield empty fields and fail later when parsed.
    pub fn read_rows<P: AsRef<Path>>(path: P) -> TileResult<Vec<PropertyRow>> {
        let path = path.as_ref();
        log::info!("Reading property table: {}", path.display());

        if !path.is_file() {
            return Err(TileError::MissingInputFile(path.to_path_buf()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        log::debug!("Header: {:?}", headers);

        let mut positions = [0usize; 3];
        for (slot, column) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| TileError::MissingColumn(column.to_string()))?;
        }
        let [id_col, lat_col, long_col] = positions;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let field = |idx: usize| record.get(idx).unwrap_or("").to_string();
            rows.push(PropertyRow {
                id: field(id_col),
                lat: field(lat_col),
                long: field(long_col),
            });
        }

        log::info!("Loaded {} property rows", rows.len());
        Ok(rows)
    }
}
