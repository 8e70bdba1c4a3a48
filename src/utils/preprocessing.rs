//! Model input preparation
//!
//! Converts an arbitrary-resolution image into the fixed-size tensor pair the
//! inpainting network expects: a channel-planar RGB image tensor and a binary
//! mask tensor marking the bottom-right watermark region.

use crate::config::RegionRatios;
use crate::error::{InpaintError, Result};
use crate::region::watermark_region;
use image::{imageops, DynamicImage, RgbaImage};
use ndarray::Array4;

/// The tensor pair consumed by the inference backend
#[derive(Debug, Clone)]
pub struct ModelInputs {
    /// Image tensor, shape `[1, 3, S, S]`, values in `[0, 1]`, planes R, G, B
    pub image: Array4<f32>,
    /// Mask tensor, shape `[1, 1, S, S]`, values in `{0.0, 1.0}`
    pub mask: Array4<f32>,
}

/// Builds model input tensors from source images
pub struct ModelInputAdapter;

impl ModelInputAdapter {
    /// Prepare the image and mask tensors for one inference run.
    ///
    /// The source is stretched to `input_size` x `input_size` with a bilinear
    /// filter; aspect ratio is deliberately ignored since the network only
    /// operates at a fixed square resolution. The mask marks the inference
    /// region computed from the *base* ratios (no extended override).
    ///
    /// # Errors
    /// - [`InpaintError::Decode`] when the source has no pixels to resample
    pub fn prepare(
        image: &DynamicImage,
        input_size: u32,
        ratios: &RegionRatios,
    ) -> Result<ModelInputs> {
        let resized = Self::resize_for_model(image, input_size)?;
        let image_tensor = Self::image_to_tensor(&resized);
        let mask_tensor = Self::mask_tensor(input_size, ratios);
        Ok(ModelInputs {
            image: image_tensor,
            mask: mask_tensor,
        })
    }

    /// Stretch-resize the source to the square model resolution.
    fn resize_for_model(image: &DynamicImage, input_size: u32) -> Result<RgbaImage> {
        if image.width() == 0 || image.height() == 0 {
            return Err(InpaintError::decode(
                "Cannot prepare model input from an empty image surface",
            ));
        }
        let rgba = image.to_rgba8();
        Ok(imageops::resize(
            &rgba,
            input_size,
            input_size,
            imageops::FilterType::Triangle,
        ))
    }

    /// Convert the resampled buffer into a channel-planar `[1, 3, S, S]`
    /// tensor with each channel byte mapped into `[0, 1]`.
    fn image_to_tensor(resized: &RgbaImage) -> Array4<f32> {
        let (width, height) = resized.dimensions();
        let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));

        #[allow(clippy::indexing_slicing)]
        // Safe: tensor dimensions pre-allocated to match the resized buffer
        for (x, y, pixel) in resized.enumerate_pixels() {
            let (xi, yi) = (x as usize, y as usize);
            tensor[[0, 0, yi, xi]] = f32::from(pixel[0]) / 255.0;
            tensor[[0, 1, yi, xi]] = f32::from(pixel[1]) / 255.0;
            tensor[[0, 2, yi, xi]] = f32::from(pixel[2]) / 255.0;
        }

        tensor
    }

    /// Build the `[1, 1, S, S]` binary mask from the base-ratio region.
    ///
    /// A pixel is masked (1.0) when both coordinates are at or beyond the
    /// region's top-left corner, i.e. inside the bottom-right rectangle.
    fn mask_tensor(input_size: u32, ratios: &RegionRatios) -> Array4<f32> {
        let size = input_size as usize;
        let region = watermark_region(
            input_size,
            input_size,
            ratios.width_ratio,
            ratios.height_ratio,
            None,
        );
        let mut mask = Array4::<f32>::zeros((1, 1, size, size));

        #[allow(clippy::indexing_slicing)]
        // Safe: region coordinates are within [0, input_size] by construction
        for y in region.y as usize..size {
            for x in region.x as usize..size {
                mask[[0, 0, y, x]] = 1.0;
            }
        }

        mask
    }
}
