use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Single-band 8-bit raster (rows x cols)
pub type GrayImage = Array2<u8>;

/// Multi-band 8-bit raster (rows x cols x bands)
pub type BandImage = Array3<u8>;

/// Coordinate reference system enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crs {
    /// WGS84 geographic coordinates (EPSG:4326), lon/lat axis order
    Wgs84,
}

impl Crs {
    /// OGC URL identifying the CRS in Process API requests
    pub fn opengis_url(&self) -> &'static str {
        match self {
            Crs::Wgs84 => "http://www.opengis.net/def/crs/EPSG/0/4326",
        }
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Crs::Wgs84 => write!(f, "EPSG:4326"),
        }
    }
}

/// Geospatial bounding box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
    pub crs: Crs,
}

impl BoundingBox {
    /// Corners in `[min_lon, min_lat, max_lon, max_lat]` order
    pub fn as_array(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }
}

/// One property location to image
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRecord {
    pub id: i64,
    pub lat: f64,
    pub long: f64,
}

impl PropertyRecord {
    /// Output file name, unique per (id, lat, long) at 5 decimal places
    pub fn image_filename(&self) -> String {
        format!("{}_{:.5}_{:.5}.png", self.id, self.lat, self.long)
    }
}

/// Raw text of one input row, before numeric parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRow {
    pub id: String,
    pub lat: String,
    pub long: String,
}

impl TryFrom<&PropertyRow> for PropertyRecord {
    type Error = TileError;

    fn try_from(row: &PropertyRow) -> TileResult<Self> {
        let id = parse_id(&row.id)?;
        let lat = parse_coordinate("lat", &row.lat)?;
        let long = parse_coordinate("long", &row.long)?;
        Ok(PropertyRecord { id, lat, long })
    }
}

/// Integer ids may arrive as float text ("42.0"); truncate like an integer cast
fn parse_id(raw: &str) -> TileResult<i64> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<i64>() {
        return Ok(id);
    }

    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= i64::MIN as f64 && value < i64::MAX as f64 => {
            Ok(value.trunc() as i64)
        }
        _ => Err(TileError::InvalidFormat(format!(
            "cannot convert id '{}' to integer",
            raw
        ))),
    }
}

fn parse_coordinate(column: &str, raw: &str) -> TileResult<f64> {
    raw.trim().parse::<f64>().map_err(|_| {
        TileError::InvalidFormat(format!("cannot convert {} '{}' to float", column, raw))
    })
}

/// Pixel payload returned by the imagery service
#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    SingleBand(GrayImage),
    MultiBand(BandImage),
}

impl PixelData {
    pub fn dim(&self) -> (usize, usize, usize) {
        match self {
            PixelData::SingleBand(data) => {
                let (rows, cols) = data.dim();
                (rows, cols, 1)
            }
            PixelData::MultiBand(data) => data.dim(),
        }
    }
}

/// A row that did not produce an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub id: String,
    pub error: String,
}

/// Error types for tile fetching
#[derive(Debug, thiserror::Error)]
pub enum TileError {
    #[error("CSV file not found at {}", .0.display())]
    MissingInputFile(PathBuf),

    #[error("CSV must contain 'id', 'lat', and 'long' columns (missing '{0}')")]
    MissingColumn(String),

    #[error("Empty image data returned")]
    EmptyResponse,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("{0}")]
    Http(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for tile operations
pub type TileResult<T> = Result<T, TileError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, lat: &str, long: &str) -> PropertyRow {
        PropertyRow {
            id: id.to_string(),
            lat: lat.to_string(),
            long: long.to_string(),
        }
    }

    #[test]
    fn test_image_filename_precision() {
        let record = PropertyRecord { id: 42, lat: 37.7749, long: -122.4194 };
        assert_eq!(record.image_filename(), "42_37.77490_-122.41940.png");
    }

    #[test]
    fn test_filenames_differ_at_fifth_decimal() {
        let a = PropertyRecord { id: 7, lat: 10.00001, long: 20.0 };
        let b = PropertyRecord { id: 7, lat: 10.00002, long: 20.0 };
        assert_ne!(a.image_filename(), b.image_filename());
    }

    #[test]
    fn test_parse_row() {
        let record = PropertyRecord::try_from(&row("42", "37.7749", "-122.4194")).unwrap();
        assert_eq!(record.id, 42);
        assert_eq!(record.lat, 37.7749);
        assert_eq!(record.long, -122.4194);
    }

    #[test]
    fn test_parse_float_id() {
        let record = PropertyRecord::try_from(&row("42.0", "1.0", "2.0")).unwrap();
        assert_eq!(record.id, 42);
    }

    #[test]
    fn test_parse_bad_values() {
        let err = PropertyRecord::try_from(&row("abc", "1.0", "2.0")).unwrap_err();
        assert!(matches!(err, TileError::InvalidFormat(_)));

        let err = PropertyRecord::try_from(&row("1", "", "2.0")).unwrap_err();
        assert!(err.to_string().contains("lat"));
    }

    #[test]
    fn test_parse_id_outside_integer_range() {
        for raw in ["1e19", "9.3e18", "-1e19", "inf", "NaN"] {
            let err = PropertyRecord::try_from(&row(raw, "1.0", "2.0")).unwrap_err();
            assert!(matches!(err, TileError::InvalidFormat(_)), "id {}", raw);
        }
        let record = PropertyRecord::try_from(&row("-4.0e3", "1.0", "2.0")).unwrap();
        assert_eq!(record.id, -4000);
    }

    #[test]
    fn test_out_of_range_coordinates_pass_through() {
        let record = PropertyRecord::try_from(&row("1", "123.0", "500.0")).unwrap();
        assert_eq!(record.lat, 123.0);
        assert_eq!(record.long, 500.0);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(TileError::EmptyResponse.to_string(), "Empty image data returned");
        let err = TileError::MissingInputFile(PathBuf::from("data/raw/x.csv"));
        assert_eq!(err.to_string(), "CSV file not found at data/raw/x.csv");
    }
}
