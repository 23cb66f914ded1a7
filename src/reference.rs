//! Reference image loading and preparation.

use std::io::Cursor;
use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use crate::error::ReferenceError;

/// Load an image from disk and convert it to 8-bit RGB.
///
/// # Errors
///
/// Returns [`ReferenceError::NotFound`] if the path does not exist, or
/// [`ReferenceError::Decode`] if it cannot be opened or decoded.
pub fn load_image(path: &Path) -> Result<DynamicImage, ReferenceError> {
    if !path.exists() {
        return Err(ReferenceError::NotFound(path.to_path_buf()));
    }
    let image = image::ImageReader::open(path)
        .map_err(|e| ReferenceError::Decode(image::ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| ReferenceError::Decode(image::ImageError::IoError(e)))?
        .decode()
        .map_err(ReferenceError::Decode)?;
    Ok(DynamicImage::ImageRgb8(image.to_rgb8()))
}

/// Bound the reference size before it is sent to the pipeline.
///
/// Images whose shorter side exceeds `target_size` are downscaled so the
/// shorter side equals it; smaller images pass through untouched.
#[must_use]
pub fn preprocess_image(image: DynamicImage, target_size: u32) -> DynamicImage {
    let (width, height) = (image.width(), image.height());
    let short = width.min(height);
    if target_size == 0 || short <= target_size {
        return image;
    }
    let ratio = f64::from(target_size) / f64::from(short);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scale = |side: u32| ((f64::from(side) * ratio).round() as u32).max(1);
    image.resize_exact(scale(width), scale(height), FilterType::Lanczos3)
}

/// Encode an image as PNG for transport.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, ReferenceError> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).map_err(ReferenceError::Encode)?;
    Ok(buf.into_inner())
}
