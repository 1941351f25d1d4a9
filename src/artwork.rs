//! Cover art processing
//!
//! User-supplied images are normalized to a 600x900 portrait JPEG stored in
//! the managed images directory.

use chrono::Utc;
use image::imageops::FilterType;
use image::{ImageFormat, ImageReader};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::log_info;

pub const COVER_WIDTH: u32 = 600;
pub const COVER_HEIGHT: u32 = 900;

/// Whether `image` already lives directly inside the managed images directory.
pub fn is_managed(image: &Path, images_dir: &Path) -> bool {
    image.parent() == Some(images_dir)
}

/// Path for a cover downloaded from the catalog: `<images_dir>/<id>.jpg`.
pub fn catalog_cover_path(images_dir: &Path, id: u64) -> PathBuf {
    images_dir.join(format!("{}.jpg", id))
}

/// A not yet existing `custom_<nanos>.jpg` path in `images_dir`.
fn unique_custom_path(images_dir: &Path) -> PathBuf {
    let mut stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    loop {
        let candidate = images_dir.join(format!("custom_{}.jpg", stamp));
        if !candidate.exists() {
            return candidate;
        }
        stamp += 1;
    }
}

/// Decode `src`, resize it to 600x900 with Lanczos3 and store it as a new
/// JPEG in `images_dir`. Returns the new path.
pub fn process_custom_image(src: &Path, images_dir: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let img = ImageReader::open(src)?.with_guessed_format()?.decode()?;
    let resized = img.resize_exact(COVER_WIDTH, COVER_HEIGHT, FilterType::Lanczos3);

    fs::create_dir_all(images_dir)?;
    let dest = unique_custom_path(images_dir);
    // JPEG has no alpha channel
    resized.to_rgb8().save_with_format(&dest, ImageFormat::Jpeg)?;

    log_info(&format!("Processed cover {} -> {}", src.display(), dest.display()));
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_is_managed() {
        let images = Path::new("/home/u/.config/umu-front/images");
        assert!(is_managed(&images.join("440.jpg"), images));
        assert!(!is_managed(Path::new("/home/u/Pictures/cover.png"), images));
        assert!(!is_managed(&images.join("sub").join("x.jpg"), images));
    }

    #[test]
    fn test_process_resizes_to_cover() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("wide.png");
        RgbaImage::from_pixel(64, 32, Rgba([200, 10, 10, 128]))
            .save(&src)
            .unwrap();

        let images = dir.path().join("images");
        let out = process_custom_image(&src, &images).unwrap();

        assert!(is_managed(&out, &images));
        let name = out.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("custom_") && name.ends_with(".jpg"));

        let decoded = image::open(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (COVER_WIDTH, COVER_HEIGHT));
    }

    #[test]
    fn test_two_covers_get_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.png");
        RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255])).save(&src).unwrap();

        let first = process_custom_image(&src, dir.path()).unwrap();
        let second = process_custom_image(&src, dir.path()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_undecodable_image_fails() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("notes.png");
        fs::write(&src, b"definitely not a png").unwrap();
        assert!(process_custom_image(&src, dir.path()).is_err());
    }
}
