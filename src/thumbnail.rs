use crate::ingest::IngestError;
use fast_image_resize::{images::Image, ResizeOptions, Resizer};
use image::{DynamicImage, RgbaImage};
use std::collections::hash_map::DefaultHasher;
use std::fs::{self, File};
use std::hash::{Hash, Hasher};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::warn;

const UNSHARP_SIGMA: f32 = 0.5;
const UNSHARP_THRESHOLD: i32 = 1;

/// On-disk cache of downscaled JPEG renderings, keyed by source path + mtime.
#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    cache_dir: PathBuf,
    quality: u8,
}

impl ThumbnailCache {
    pub fn in_dir(cache_dir: PathBuf, quality: u8) -> Self {
        let _ = fs::create_dir_all(&cache_dir);
        Self { cache_dir, quality }
    }

    /// Generate a hash-based filename for the thumbnail
    fn thumb_filename(&self, source_path: &Path, max_w: u32, max_h: u32) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        source_path.to_string_lossy().hash(&mut hasher);
        (max_w, max_h).hash(&mut hasher);

        if let Ok(metadata) = fs::metadata(source_path) {
            if let Ok(modified) = metadata.modified() {
                modified.hash(&mut hasher);
            }
        }

        self.cache_dir.join(format!("{:016x}.jpg", hasher.finish()))
    }

    /// Produce (or reuse) a thumbnail bounded by `max_w` x `max_h` and return its path.
    pub fn create(&self, source_path: &Path, max_w: u32, max_h: u32) -> Result<PathBuf, IngestError> {
        let thumb_path = self.thumb_filename(source_path, max_w, max_h);
        if thumb_path.exists() && image::open(&thumb_path).is_ok() {
            return Ok(thumb_path);
        }

        let src_image = image::open(source_path).map_err(|source| IngestError::Decode {
            path: source_path.to_path_buf(),
            source,
        })?;
        let result_image = build_thumbnail_image(src_image, max_w, max_h)?;
        save_as_jpeg(&result_image, &thumb_path, self.quality)?;
        Ok(thumb_path)
    }

    /// Load a cached thumbnail for display, regenerating it when the cache entry is unreadable.
    pub fn load(
        &self,
        thumb_path: &Path,
        source_path: &Path,
        max_w: u32,
        max_h: u32,
    ) -> Result<DynamicImage, IngestError> {
        match image::open(thumb_path) {
            Ok(img) => Ok(img),
            Err(err) => {
                warn!(
                    thumb = %thumb_path.display(),
                    error = %err,
                    "cached thumbnail unreadable, regenerating"
                );
                let _ = fs::remove_file(thumb_path);
                let fresh = self.create(source_path, max_w, max_h)?;
                image::open(&fresh).map_err(|source| IngestError::Decode {
                    path: fresh,
                    source,
                })
            }
        }
    }
}

/// Calculate dimensions that fit within bounds while maintaining aspect ratio
pub fn fit_dimensions(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if src_w == 0 || src_h == 0 {
        return (max_w.max(1), max_h.max(1));
    }
    let ratio_w = max_w as f32 / src_w as f32;
    let ratio_h = max_h as f32 / src_h as f32;
    // Never upscale small sources.
    let ratio = ratio_w.min(ratio_h).min(1.0);

    let dst_w = (src_w as f32 * ratio).round() as u32;
    let dst_h = (src_h as f32 * ratio).round() as u32;

    (dst_w.max(1), dst_h.max(1))
}

fn build_thumbnail_image(src_image: DynamicImage, max_w: u32, max_h: u32) -> Result<RgbaImage, IngestError> {
    let src_rgba = src_image.to_rgba8();
    let (src_width, src_height) = (src_rgba.width(), src_rgba.height());
    let (dst_width, dst_height) = fit_dimensions(src_width, src_height, max_w, max_h);

    let src_fir = Image::from_vec_u8(
        src_width,
        src_height,
        src_rgba.into_raw(),
        fast_image_resize::PixelType::U8x4,
    )
    .map_err(|e| IngestError::Thumbnail(e.to_string()))?;

    let mut dst_fir = Image::new(dst_width, dst_height, fast_image_resize::PixelType::U8x4);

    let mut resizer = Resizer::new();
    resizer
        .resize(
            &src_fir,
            &mut dst_fir,
            &ResizeOptions::new().resize_alg(fast_image_resize::ResizeAlg::Convolution(
                fast_image_resize::FilterType::Lanczos3,
            )),
        )
        .map_err(|e| IngestError::Thumbnail(e.to_string()))?;

    let result_image = RgbaImage::from_raw(dst_width, dst_height, dst_fir.into_vec())
        .ok_or_else(|| IngestError::Thumbnail("resized buffer has wrong length".into()))?;

    Ok(image::imageops::unsharpen(
        &result_image,
        UNSHARP_SIGMA,
        UNSHARP_THRESHOLD,
    ))
}

/// Save RGBA image as JPEG with specified quality
fn save_as_jpeg(img: &RgbaImage, path: &Path, quality: u8) -> Result<(), IngestError> {
    let rgb_img = DynamicImage::ImageRgba8(img.clone()).to_rgb8();

    let file = File::create(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let writer = BufWriter::new(file);

    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality);
    encoder
        .encode_image(&rgb_img)
        .map_err(|e| IngestError::Thumbnail(format!("JPEG encode {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn fit_dimensions_preserves_aspect_ratio() {
        assert_eq!(fit_dimensions(3840, 2160, 800, 600), (800, 450));
        assert_eq!(fit_dimensions(1080, 1920, 800, 600), (338, 600));
    }

    #[test]
    fn fit_dimensions_never_upscales() {
        assert_eq!(fit_dimensions(64, 32, 800, 600), (64, 32));
    }

    #[test]
    fn create_writes_bounded_jpeg() {
        let root = tempfile::tempdir().expect("tempdir");
        let source_path = root.path().join("wide.png");
        RgbImage::from_pixel(400, 200, Rgb([240, 80, 80]))
            .save(&source_path)
            .expect("save source");

        let cache = ThumbnailCache::in_dir(root.path().join("thumbs"), 85);
        let thumb = cache.create(&source_path, 100, 100).expect("thumbnail");
        let img = image::open(&thumb).expect("open thumb");
        assert_eq!((img.width(), img.height()), (100, 50));
    }

    #[test]
    fn load_regenerates_corrupted_cached_thumbnail() {
        let root = tempfile::tempdir().expect("tempdir");
        let source_path = root.path().join("image.png");
        RgbImage::from_pixel(64, 64, Rgb([10, 80, 200]))
            .save(&source_path)
            .expect("save source");

        let cache = ThumbnailCache::in_dir(root.path().join("thumbs"), 85);
        let thumb_path = cache.create(&source_path, 32, 32).expect("thumbnail");
        fs::write(&thumb_path, b"not-a-valid-jpeg").expect("corrupt");

        let loaded = cache
            .load(&thumb_path, &source_path, 32, 32)
            .expect("regenerated");
        assert_eq!((loaded.width(), loaded.height()), (32, 32));
    }
}
