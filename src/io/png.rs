use crate::types::{BandImage, PixelData, TileError, TileResult};
use image::{DynamicImage, ImageFormat};
use ndarray::{Array2, Array3};
use std::path::Path;

/// Destination for normalized tiles
pub trait ImageSink {
    fn save(&self, pixels: &BandImage, path: &Path) -> TileResult<()>;
}

/// Encodes (rows, cols, bands) rasters as PNG files
#[derive(Debug, Default, Clone, Copy)]
pub struct PngWriter;

impl ImageSink for PngWriter {
    fn save(&self, pixels: &BandImage, path: &Path) -> TileResult<()> {
        let (rows, cols, bands) = pixels.dim();
        let (width, height) = (cols as u32, rows as u32);
        let raw: Vec<u8> = pixels.iter().copied().collect();

        let image = match bands {
            1 => image::GrayImage::from_raw(width, height, raw).map(DynamicImage::ImageLuma8),
            3 => image::RgbImage::from_raw(width, height, raw).map(DynamicImage::ImageRgb8),
            4 => image::RgbaImage::from_raw(width, height, raw).map(DynamicImage::ImageRgba8),
            n => {
                return Err(TileError::InvalidFormat(format!(
                    "cannot encode {}-band raster as PNG",
                    n
                )))
            }
        }
        .ok_or_else(|| {
            TileError::InvalidFormat(format!("pixel buffer does not match {}x{}x{}", rows, cols, bands))
        })?;

        image.save_with_format(path, ImageFormat::Png)?;
        log::debug!("Saved {}x{}x{} PNG to {}", rows, cols, bands, path.display());
        Ok(())
    }
}

/// Decode an encoded PNG payload into pixel data.
///
/// Grayscale images become single-band data, RGB and RGBA stay multi-band,
/// anything else (16-bit, gray+alpha) is converted to 8-bit RGB.
pub fn decode_png(bytes: &[u8]) -> TileResult<PixelData> {
    let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
    let (width, height) = (image.width() as usize, image.height() as usize);

    let shape_err = |e: ndarray::ShapeError| TileError::InvalidFormat(format!("PNG payload: {}", e));

    let pixels = match image {
        DynamicImage::ImageLuma8(buf) => {
            PixelData::SingleBand(Array2::from_shape_vec((height, width), buf.into_raw()).map_err(shape_err)?)
        }
        DynamicImage::ImageRgb8(buf) => {
            PixelData::MultiBand(Array3::from_shape_vec((height, width, 3), buf.into_raw()).map_err(shape_err)?)
        }
        DynamicImage::ImageRgba8(buf) => {
            PixelData::MultiBand(Array3::from_shape_vec((height, width, 4), buf.into_raw()).map_err(shape_err)?)
        }
        other => {
            log::debug!("Converting {:?} PNG payload to RGB8", other.color());
            let buf = other.to_rgb8();
            PixelData::MultiBand(Array3::from_shape_vec((height, width, 3), buf.into_raw()).map_err(shape_err)?)
        }
    };

    Ok(pixels)
}
