//! Full-resolution compositing
//!
//! Merges the decoded inpainting patch back into the untouched original. The
//! blend uses the *extended* ratio so the patch edge lands on pixels the
//! network regenerated outside the strict mask, hiding the seam.

use crate::config::RegionRatios;
use crate::error::{InpaintError, Result};
use crate::region::watermark_region;
use image::{imageops, DynamicImage, RgbaImage};

/// Composite the decoded patch into the full-resolution original.
///
/// Two regions are derived with the extended-ratio override: one at the
/// original resolution, one at the model resolution. The model-region
/// sub-rectangle of the patch is stretch-blitted into the original-region
/// sub-rectangle of a copy of the original; everything outside stays
/// untouched.
///
/// # Errors
/// - [`InpaintError::Composition`] when the patch does not match the model
///   resolution or either blend region is degenerate
pub fn composite_patch(
    original: &DynamicImage,
    patch: &RgbaImage,
    model_input_size: u32,
    ratios: &RegionRatios,
) -> Result<RgbaImage> {
    if patch.width() != model_input_size || patch.height() != model_input_size {
        return Err(InpaintError::composition(format!(
            "Decoded patch is {}x{}, expected {model_input_size}x{model_input_size}",
            patch.width(),
            patch.height()
        )));
    }

    let (orig_width, orig_height) = (original.width(), original.height());
    let orig_region = watermark_region(
        orig_width,
        orig_height,
        ratios.width_ratio,
        ratios.height_ratio,
        Some(ratios.extended_ratio),
    );
    let model_region = watermark_region(
        model_input_size,
        model_input_size,
        ratios.width_ratio,
        ratios.height_ratio,
        Some(ratios.extended_ratio),
    );

    if orig_region.is_empty() || model_region.is_empty() {
        return Err(InpaintError::composition(
            "Cannot prepare a compositing surface for an empty blend region",
        ));
    }

    let mut canvas = original.to_rgba8();

    // Crop the patch to the model-resolution blend region, then stretch it
    // to fit the original-resolution blend region.
    let cropped = imageops::crop_imm(
        patch,
        model_region.x,
        model_region.y,
        model_region.width,
        model_region.height,
    )
    .to_image();
    let scaled = imageops::resize(
        &cropped,
        orig_region.width,
        orig_region.height,
        imageops::FilterType::Triangle,
    );

    imageops::replace(
        &mut canvas,
        &scaled,
        i64::from(orig_region.x),
        i64::from(orig_region.y),
    );

    Ok(canvas)
}
