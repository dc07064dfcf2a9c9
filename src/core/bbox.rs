use crate::types::{BoundingBox, Crs, TileError, TileResult};
use geo::{Distance, Geodesic, Point};

/// Half-width of the square extent around a property, in degrees
pub const BUFFER_DEG: f64 = 0.015;

/// Build the fixed-size WGS84 extent centred on a coordinate.
///
/// Coordinates are not range-checked; invalid input is left for the
/// imagery service to reject.
pub fn build_bbox(lat: f64, lon: f64) -> BoundingBox {
    BoundingBox {
        min_lon: lon - BUFFER_DEG,
        min_lat: lat - BUFFER_DEG,
        max_lon: lon + BUFFER_DEG,
        max_lat: lat + BUFFER_DEG,
        crs: Crs::Wgs84,
    }
}

/// Pixel dimensions `(width, height)` covering `bbox` at `resolution` meters per pixel
///
/// # Arguments
/// * `bbox` - Extent in geographic coordinates
/// * `resolution` - Target ground resolution in meters
///
/// Width is the geodesic length of the centre parallel across the box,
/// height the length of the centre meridian. Both are at least one pixel.
/// Extents reaching past a pole, or with non-finite corners, have no
/// measurable size and are rejected.
pub fn bbox_to_dimensions(bbox: &BoundingBox, resolution: f64) -> TileResult<(u32, u32)> {
    let corners = bbox.as_array();
    if corners.iter().any(|c| !c.is_finite()) || bbox.min_lat < -90.0 || bbox.max_lat > 90.0 {
        return Err(TileError::InvalidFormat(format!(
            "cannot compute pixel size of bounding box {:?}",
            corners
        )));
    }

    let (center_lon, center_lat) = bbox.center();

    let width_m = Geodesic.distance(
        Point::new(bbox.min_lon, center_lat),
        Point::new(bbox.max_lon, center_lat),
    );
    let height_m = Geodesic.distance(
        Point::new(center_lon, bbox.min_lat),
        Point::new(center_lon, bbox.max_lat),
    );

    let width = pixels_for(width_m, resolution, bbox)?;
    let height = pixels_for(height_m, resolution, bbox)?;

    log::debug!(
        "Extent {:.1}m x {:.1}m at {}m/px -> {}x{} pixels",
        width_m, height_m, resolution, width, height
    );

    Ok((width, height))
}

fn pixels_for(length_m: f64, resolution: f64, bbox: &BoundingBox) -> TileResult<u32> {
    let pixels = (length_m / resolution).round();
    if !pixels.is_finite() || pixels < 0.0 || pixels > u32::MAX as f64 {
        return Err(TileError::InvalidFormat(format!(
            "cannot compute pixel size of bounding box {:?} at {}m/px",
            bbox.as_array(),
            resolution
        )));
    }
    Ok((pixels as u32).max(1))
}
