use crate::types::{BandImage, PixelData, TileError, TileResult};
use ndarray::Axis;

/// Bring a service payload to an 8-bit (rows, cols, bands) raster.
///
/// Single-band data is broadcast to three identical channels. Multi-band
/// data is returned as-is.
pub fn to_rgb(pixels: PixelData) -> TileResult<BandImage> {
    match pixels {
        PixelData::SingleBand(gray) => {
            let (rows, cols) = gray.dim();
            log::debug!("Broadcasting single-band {}x{} payload to 3 channels", rows, cols);

            let plane = gray.insert_axis(Axis(2));
            let rgb = plane
                .broadcast((rows, cols, 3))
                .ok_or_else(|| {
                    TileError::InvalidFormat(format!(
                        "cannot broadcast {}x{} band to 3 channels",
                        rows, cols
                    ))
                })?
                .to_owned();
            Ok(rgb)
        }
        PixelData::MultiBand(bands) => Ok(bands),
    }
}
