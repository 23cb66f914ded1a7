//! Saving the generated image.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};

use crate::error::OutputError;

/// Save an image, choosing the encoding from the path's extension.
///
/// # Errors
///
/// Returns an error if the extension maps to no known format, or if
/// encoding or writing fails.
pub fn save_image(image: &DynamicImage, path: &Path) -> Result<(), OutputError> {
    let format =
        ImageFormat::from_path(path).map_err(|_| OutputError::UnknownFormat(path.to_path_buf()))?;

    // JPEG has no alpha channel.
    if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(image.to_rgb8()).save_with_format(path, format)?;
    } else {
        image.save_with_format(path, format)?;
    }
    Ok(())
}

/// Absolute form of `path` for display, or the path itself if that fails.
#[must_use]
pub fn display_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn png_by_extension() {
        let path = std::env::temp_dir().join("mnemosyne_output_test.png");
        save_image(&DynamicImage::new_rgb8(2, 2), &path).unwrap();

        let data = std::fs::read(&path).unwrap();
        assert_eq!(&data[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn jpeg_drops_alpha() {
        let path = std::env::temp_dir().join("mnemosyne_output_test.jpg");
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 4])));
        save_image(&image, &path).unwrap();

        let data = std::fs::read(&path).unwrap();
        assert_eq!(&data[..2], &[0xFF, 0xD8]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unknown_extension_rejected() {
        let path = std::env::temp_dir().join("mnemosyne_output_test.unknown");
        let err = save_image(&DynamicImage::new_rgb8(1, 1), &path).unwrap_err();
        assert!(matches!(err, OutputError::UnknownFormat(_)));
        assert!(!path.exists());
    }

    #[test]
    fn display_path_is_absolute() {
        assert!(display_path(Path::new("output.png")).is_absolute());
    }
}
