//! Image input/output service
//!
//! Decodes arbitrary raster bytes into [`DynamicImage`]s and writes the
//! final artifact as lossless PNG at full original resolution.

use crate::error::{InpaintError, Result};
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};
use std::path::Path;

/// Image IO helpers shared by the library entry points and the CLI
pub struct ImageIOService;

impl ImageIOService {
    /// Read a file into memory through the async runtime.
    ///
    /// # Errors
    /// - [`InpaintError::Io`] with path context on read failure
    pub async fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        let path_ref = path.as_ref();
        tokio::fs::read(path_ref)
            .await
            .map_err(|e| InpaintError::file_io_error("read image file", path_ref, e))
    }

    /// Decode raster bytes into an image.
    ///
    /// # Errors
    /// - [`InpaintError::Decode`] when the bytes are not a decodable raster
    pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(bytes)
            .map_err(|e| InpaintError::decode(format!("Failed to decode image from bytes: {e}")))
    }

    /// Encode an RGBA buffer as lossless PNG bytes.
    ///
    /// # Errors
    /// - [`InpaintError::Composition`] when encoding fails
    pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let encoder = PngEncoder::new(&mut bytes);
        encoder
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| {
                InpaintError::composition(format!("Failed to encode PNG output: {e}"))
            })?;
        Ok(bytes)
    }

    /// Encode an RGBA buffer as lossless PNG and write it to disk.
    ///
    /// # Errors
    /// - [`InpaintError::Composition`] when encoding fails
    /// - [`InpaintError::Io`] with path context on write failure
    pub fn save_png<P: AsRef<Path>>(image: &RgbaImage, path: P) -> Result<()> {
        let path_ref = path.as_ref();
        let bytes = Self::encode_png(image)?;
        std::fs::write(path_ref, bytes)
            .map_err(|e| InpaintError::file_io_error("write output image", path_ref, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checker(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        })
    }

    #[test]
    fn test_png_round_trip_is_lossless() {
        let original = checker(16, 9);
        let bytes = ImageIOService::encode_png(&original).unwrap();
        let decoded = ImageIOService::decode_image(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (16, 9));
        assert_eq!(decoded.as_raw(), original.as_raw());
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let err = ImageIOService::decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, InpaintError::Decode(_)));
    }

    #[tokio::test]
    async fn test_read_missing_file_has_path_context() {
        let err = ImageIOService::read_bytes("/nonexistent/input.png")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("input.png"));
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        ImageIOService::save_png(&checker(8, 8), &path).unwrap();
        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (8, 8));
    }
}
