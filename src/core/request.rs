use crate::core::bbox::{bbox_to_dimensions, build_bbox};
use crate::types::{BoundingBox, PropertyRecord, TileError, TileResult};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Ground resolution of requested tiles in meters per pixel
pub const TARGET_RESOLUTION_M: f64 = 5.0;

/// Acquisition window (inclusive, whole days)
pub const TIME_RANGE: (&str, &str) = ("2020-05-01", "2020-09-30");

/// True-color evalscript: B04/B03/B02 reflectance scaled by 2.5 into UINT8
pub const EVALSCRIPT: &str = r#"//VERSION=3
function setup() {
  return {
    input: [{
      bands: ["B02", "B03", "B04"],
      units: "REFLECTANCE"
    }],
    output: { bands: 3, sampleType: "UINT8" }
  };
}

function evaluatePixel(sample) {
  return [
    Math.max(0, Math.min(255, 2.5 * sample.B04 * 255)),
    Math.max(0, Math.min(255, 2.5 * sample.B03 * 255)),
    Math.max(0, Math.min(255, 2.5 * sample.B02 * 255))
  ];
}
"#;

/// Data collections understood by the Process API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataCollection {
    /// Sentinel-2 MSI bottom-of-atmosphere reflectance
    Sentinel2L2A,
}

impl DataCollection {
    pub fn api_id(&self) -> &'static str {
        match self {
            DataCollection::Sentinel2L2A => "sentinel-2-l2a",
        }
    }
}

impl std::fmt::Display for DataCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.api_id())
    }
}

/// UTC acquisition interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeInterval {
    /// Expand `YYYY-MM-DD` day bounds to start-of-day .. end-of-day UTC
    pub fn from_dates(start: &str, end: &str) -> TileResult<Self> {
        let parse = |s: &str| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|e| TileError::InvalidFormat(format!("invalid date '{}': {}", s, e)))
        };

        let start_day = parse(start)?;
        let end_day = parse(end)?;
        if end_day < start_day {
            return Err(TileError::InvalidFormat(format!(
                "time interval ends ({}) before it starts ({})",
                end, start
            )));
        }

        let end_of_day = end_day
            .and_hms_opt(23, 59, 59)
            .ok_or_else(|| TileError::InvalidFormat(format!("invalid end date '{}'", end)))?;

        Ok(Self {
            from: start_day.and_time(NaiveTime::MIN).and_utc(),
            to: end_of_day.and_utc(),
        })
    }
}

/// Everything the imagery service needs for one tile
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequestSpec {
    pub bbox: BoundingBox,
    /// (width, height) in pixels
    pub size: (u32, u32),
    pub evalscript: &'static str,
    pub time_interval: TimeInterval,
    pub collection: DataCollection,
}

impl ImageRequestSpec {
    /// Request for the tile centred on a property
    pub fn for_property(record: &PropertyRecord) -> TileResult<Self> {
        let bbox = build_bbox(record.lat, record.long);
        let size = bbox_to_dimensions(&bbox, TARGET_RESOLUTION_M)?;

        Ok(Self {
            bbox,
            size,
            evalscript: EVALSCRIPT,
            time_interval: TimeInterval::from_dates(TIME_RANGE.0, TIME_RANGE.1)?,
            collection: DataCollection::Sentinel2L2A,
        })
    }
}
