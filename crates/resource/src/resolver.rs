//! Turns an asset URL into a decoded image that fits a box.
//!
//! Every failure along the way (unsupported scheme, transport error, bad
//! status, undecodable bytes) yields `None`. The caller renders its fallback
//! text instead; a missing picture never fails a datasheet.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbaImage};
use log::debug;
use reqwest::Url;
use specsheet_idf::{ImageRequest, ResolvedImage};
use specsheet_traits::ResourceProvider;
use specsheet_types::Size;
use std::sync::Arc;

/// Millimetres per source pixel. Pixels are taken as points (72 dpi).
pub const MM_PER_PIXEL: f32 = 25.4 / 72.0;

/// Target resolution of embedded pixels, relative to the drawn box.
const EMBED_DPI: f32 = 300.0;

/// Scales `source` into `max`, preserving its aspect ratio.
///
/// Width is clamped first, then height. Sizes already inside the box are
/// returned unchanged; nothing is ever scaled up.
pub fn scale_to_fit(source: Size, max: Size) -> Size {
    if source.is_empty() {
        return Size::zero();
    }
    let ratio = source.aspect_ratio();
    let mut width = source.width;
    let mut height = source.height;
    if width > max.width {
        width = max.width;
        height = width / ratio;
    }
    if height > max.height {
        height = max.height;
        width = height * ratio;
    }
    Size::new(width, height)
}

#[derive(Debug, Clone)]
pub struct AssetResolver {
    provider: Arc<dyn ResourceProvider>,
}

impl AssetResolver {
    pub fn new(provider: Arc<dyn ResourceProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Fetches `url`, decodes it and scales it into `max_width` x `max_height` millimetres.
    pub fn fetch_and_scale(&self, url: &str, max_width: f32, max_height: f32) -> Option<ResolvedImage> {
        if !is_fetchable(url) {
            debug!("Skipping asset with unsupported URL '{url}'");
            return None;
        }
        let bytes = match self.provider.load(url) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!("Asset '{url}' unavailable: {err}");
                return None;
            }
        };
        let decoded = match image::load_from_memory(&bytes) {
            Ok(decoded) => decoded,
            Err(err) => {
                debug!("Asset '{url}' is not a decodable image: {err}");
                return None;
            }
        };
        Some(prepare(url, decoded, Size::new(max_width, max_height)))
    }

    pub fn resolve(&self, request: &ImageRequest) -> Option<ResolvedImage> {
        self.fetch_and_scale(&request.url, request.max.width, request.max.height)
    }
}

fn is_fetchable(url: &str) -> bool {
    Url::parse(url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
        .unwrap_or(false)
}

fn prepare(url: &str, decoded: DynamicImage, max: Size) -> ResolvedImage {
    let (px_w, px_h) = decoded.dimensions();
    let natural = Size::new(px_w as f32 * MM_PER_PIXEL, px_h as f32 * MM_PER_PIXEL);
    let size = scale_to_fit(natural, max);

    let target_w = ((size.width / 25.4 * EMBED_DPI).ceil() as u32).max(1);
    let target_h = ((size.height / 25.4 * EMBED_DPI).ceil() as u32).max(1);
    let sampled = if px_w > target_w || px_h > target_h {
        decoded.resize(target_w, target_h, FilterType::Triangle)
    } else {
        decoded
    };

    let rgba = sampled.to_rgba8();
    let (width, height) = rgba.dimensions();
    ResolvedImage::new(url, width, height, flatten_onto_white(&rgba), size)
}

fn flatten_onto_white(rgba: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::with_capacity(rgba.width() as usize * rgba.height() as usize * 3);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as u32;
        for channel in [r, g, b] {
            let blended = (channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255;
            out.push(blended as u8);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use specsheet_traits::InMemoryResourceProvider;
    use std::io::Cursor;

    fn png(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(pixel));
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn test_wide_image_is_clamped_by_width() {
        let size = scale_to_fit(Size::new(800.0, 400.0), Size::new(100.0, 100.0));
        assert!(close(size.width, 100.0) && close(size.height, 50.0));
    }

    #[test]
    fn test_tall_image_is_clamped_by_height() {
        let size = scale_to_fit(Size::new(200.0, 400.0), Size::new(50.0, 40.0));
        assert!(close(size.width, 20.0) && close(size.height, 40.0));
    }

    #[test]
    fn test_small_image_is_not_enlarged() {
        let size = scale_to_fit(Size::new(10.0, 5.0), Size::new(50.0, 40.0));
        assert_eq!(size, Size::new(10.0, 5.0));
    }

    #[test]
    fn test_degenerate_source() {
        assert!(scale_to_fit(Size::new(0.0, 10.0), Size::new(50.0, 40.0)).is_empty());
    }

    #[test]
    fn test_non_http_url_never_reaches_provider() {
        let provider = Arc::new(InMemoryResourceProvider::new().with("file:///etc/logo.png", png(2, 2, [0, 0, 0, 255])));
        let resolver = AssetResolver::new(provider.clone());
        assert!(resolver.fetch_and_scale("file:///etc/logo.png", 20.0, 15.0).is_none());
        assert!(resolver.fetch_and_scale("not a url", 20.0, 15.0).is_none());
        assert_eq!(provider.load_count(), 0);
    }

    #[test]
    fn test_undecodable_bytes_yield_none() {
        let url = "https://cdn.example.com/broken.png";
        let provider = Arc::new(InMemoryResourceProvider::new().with(url, b"not an image".to_vec()));
        let resolver = AssetResolver::new(provider.clone());
        assert!(resolver.fetch_and_scale(url, 20.0, 15.0).is_none());
        assert_eq!(provider.load_count(), 1);
    }

    #[test]
    fn test_missing_asset_yields_none() {
        let resolver = AssetResolver::new(Arc::new(InMemoryResourceProvider::new()));
        assert!(resolver.fetch_and_scale("https://cdn.example.com/gone.png", 20.0, 15.0).is_none());
    }

    #[test]
    fn test_decoded_image_fits_box_with_source_ratio() {
        let url = "https://cdn.example.com/product.png";
        let provider = Arc::new(InMemoryResourceProvider::new().with(url, png(400, 200, [10, 20, 30, 255])));
        let image = AssetResolver::new(provider).fetch_and_scale(url, 50.0, 40.0).unwrap();

        assert!(close(image.size.width, 50.0));
        assert!(close(image.size.height, 25.0));
        assert!(image.is_consistent());
        assert_eq!(&image.pixels[..3], &[10, 20, 30]);
    }

    #[test]
    fn test_transparent_pixels_become_white() {
        let url = "https://cdn.example.com/mark.png";
        let provider = Arc::new(InMemoryResourceProvider::new().with(url, png(4, 4, [0, 0, 0, 0])));
        let image = AssetResolver::new(provider).fetch_and_scale(url, 20.0, 15.0).unwrap();
        assert!(image.pixels.iter().all(|&c| c == 255));
        assert_eq!((image.pixel_width, image.pixel_height), (4, 4));
    }

    #[test]
    fn test_large_source_is_downsampled() {
        let url = "https://cdn.example.com/huge.png";
        let provider = Arc::new(InMemoryResourceProvider::new().with(url, png(2000, 1000, [200, 200, 200, 255])));
        let image = AssetResolver::new(provider).fetch_and_scale(url, 20.0, 15.0).unwrap();
        // 20 mm at 300 dpi
        assert!(image.pixel_width <= 237);
        assert!(image.is_consistent());
    }
}
