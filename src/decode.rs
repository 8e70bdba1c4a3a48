//! Output tensor decoding
//!
//! Turns the raw inpainting result (channel-planar floats at model
//! resolution) back into an RGBA pixel buffer. The numeric range of the
//! output is not part of the model contract, so it is classified with a
//! sampling heuristic before scaling.

use crate::error::{InpaintError, Result};
use image::{Rgba, RgbaImage};
use ndarray::Array4;

/// How many leading first-channel values the range classifier samples at most
const RANGE_SAMPLE_LIMIT: usize = 1000;

/// Magnitude at or below which sampled output is treated as normalized `[0, 1]`
const NORMALIZED_MAX_MAGNITUDE: f32 = 2.0;

/// Classify whether a result tensor is normalized to `[0, 1]`.
///
/// Samples the first `min(1000, total_values / 3)` values of the first
/// channel and takes their maximum absolute magnitude; at or below 2.0 the
/// tensor is treated as normalized and every value is scaled by 255 before
/// use. This is a statistical heuristic, not a certainty: a pathological
/// sample (for example a very dark first-channel crop of a byte-range
/// output) can misclassify. Callers needing certainty should carry an
/// explicit range contract with the model instead.
#[must_use]
pub fn classify_range(tensor: &Array4<f32>) -> bool {
    let sample_len = RANGE_SAMPLE_LIMIT.min(tensor.len() / 3);
    let max_magnitude = tensor
        .iter()
        .take(sample_len)
        .fold(0.0f32, |acc, &v| acc.max(v.abs()));
    max_magnitude <= NORMALIZED_MAX_MAGNITUDE
}

/// Decode a `[1, 3, H, W]` result tensor into an opaque RGBA buffer.
///
/// Every channel value is scaled per the range classification, clamped to
/// `[0, 255]`, and rounded to the nearest integer; alpha is fully opaque.
///
/// # Errors
/// - [`InpaintError::Decode`] when the tensor is not `[1, 3, H, W]`
#[allow(clippy::indexing_slicing)] // Shape length is fixed at 4 by Array4
pub fn decode_output(tensor: &Array4<f32>) -> Result<RgbaImage> {
    let shape = tensor.shape();
    let (batch, channels) = (shape[0], shape[1]);
    if batch != 1 || channels != 3 {
        return Err(InpaintError::decode(format!(
            "Expected [1, 3, H, W] output tensor, got {shape:?}"
        )));
    }
    let (height, width) = (shape[2], shape[3]);

    let scale = if classify_range(tensor) { 255.0 } else { 1.0 };

    let mut output = RgbaImage::new(width as u32, height as u32);
    #[allow(clippy::indexing_slicing)]
    // Safe: x and y iterate within the tensor's own H and W dimensions
    for (x, y, pixel) in output.enumerate_pixels_mut() {
        let (xi, yi) = (x as usize, y as usize);
        let r = quantize(tensor[[0, 0, yi, xi]] * scale);
        let g = quantize(tensor[[0, 1, yi, xi]] * scale);
        let b = quantize(tensor[[0, 2, yi, xi]] * scale);
        *pixel = Rgba([r, g, b, 255]);
    }

    Ok(output)
}

/// Clamp to `[0, 255]` and round to the nearest integer
fn quantize(value: f32) -> u8 {
    value.clamp(0.0, 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    fn planar_tensor(size: usize, fill: f32) -> Array4<f32> {
        Array4::from_elem((1, 3, size, size), fill)
    }

    #[test]
    fn test_all_ones_normalized_decodes_to_white() {
        let tensor = planar_tensor(8, 1.0);
        let image = decode_output(&tensor).unwrap();
        for pixel in image.pixels() {
            assert_eq!(pixel.0, [255, 255, 255, 255]);
        }
    }

    #[test]
    fn test_byte_range_values_pass_through() {
        // Max magnitude well above 2.0, so no scaling beyond clamp/round
        let mut tensor = planar_tensor(4, 0.0);
        for y in 0..4 {
            for x in 0..4 {
                tensor[[0, 0, y, x]] = 200.4;
                tensor[[0, 1, y, x]] = 100.6;
                tensor[[0, 2, y, x]] = 300.0; // clamps to 255
            }
        }
        let image = decode_output(&tensor).unwrap();
        for pixel in image.pixels() {
            assert_eq!(pixel.0, [200, 101, 255, 255]);
        }
    }

    #[test]
    fn test_normalized_values_scale_by_255() {
        let mut tensor = planar_tensor(4, 0.5);
        tensor[[0, 1, 0, 0]] = 0.0;
        let image = decode_output(&tensor).unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [128, 0, 128, 255]);
        assert_eq!(image.get_pixel(1, 1).0, [128, 128, 128, 255]);
    }

    #[test]
    fn test_negative_values_clamp_to_zero() {
        let tensor = planar_tensor(4, -50.0);
        assert!(!classify_range(&tensor));
        let image = decode_output(&tensor).unwrap();
        for pixel in image.pixels() {
            assert_eq!(pixel.0, [0, 0, 0, 255]);
        }
    }

    #[test]
    fn test_range_classification_threshold() {
        assert!(classify_range(&planar_tensor(8, 2.0)));
        assert!(classify_range(&planar_tensor(8, -1.5)));
        assert!(!classify_range(&planar_tensor(8, 2.01)));
        assert!(!classify_range(&planar_tensor(8, 128.0)));
    }

    #[test]
    fn test_classifier_samples_only_leading_first_channel() {
        // First channel dark, later channels in byte range: the documented
        // misclassification case. The sample window never reaches them.
        let mut tensor = planar_tensor(40, 0.25);
        for y in 0..40 {
            for x in 0..40 {
                tensor[[0, 1, y, x]] = 180.0;
                tensor[[0, 2, y, x]] = 220.0;
            }
        }
        assert!(classify_range(&tensor));
    }

    #[test]
    fn test_wrong_shape_is_decode_error() {
        let tensor = Array4::<f32>::zeros((1, 1, 8, 8));
        let err = decode_output(&tensor).unwrap_err();
        assert!(matches!(err, InpaintError::Decode(_)));
    }
}
