use crate::SharedData;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use specsheet_types::Size;
use std::collections::HashMap;
use std::sync::Arc;

/// A decoded image and the box it will occupy on the page.
///
/// `pixels` holds 8-bit RGB samples, row-major, with any alpha channel already
/// composited onto white. `size` is in millimetres and always has the aspect
/// ratio of the pixel grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedImage {
    pub src: String,
    pub pixel_width: u32,
    pub pixel_height: u32,
    #[serde(serialize_with = "encode_pixels", deserialize_with = "decode_pixels")]
    pub pixels: SharedData,
    pub size: Size,
}

impl ResolvedImage {
    pub fn new(
        src: impl Into<String>,
        pixel_width: u32,
        pixel_height: u32,
        pixels: Vec<u8>,
        size: Size,
    ) -> Self {
        Self {
            src: src.into(),
            pixel_width,
            pixel_height,
            pixels: Arc::new(pixels),
            size,
        }
    }

    /// True if the pixel buffer holds exactly one RGB triple per pixel.
    pub fn is_consistent(&self) -> bool {
        self.pixels.len() == self.pixel_width as usize * self.pixel_height as usize * 3
    }
}

/// An image the composer wants, and the box it must fit.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub url: String,
    pub max: Size,
}

impl ImageRequest {
    pub fn new(url: impl Into<String>, max_width: f32, max_height: f32) -> Self {
        Self {
            url: url.into(),
            max: Size::new(max_width, max_height),
        }
    }

    /// Hashable identity: the URL and the box rounded to hundredths of a millimetre.
    pub fn key(&self) -> ImageKey {
        ImageKey {
            url: self.url.clone(),
            max_width: (self.max.width * 100.0).round() as u32,
            max_height: (self.max.height * 100.0).round() as u32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageKey {
    url: String,
    max_width: u32,
    max_height: u32,
}

/// Images fetched for one document. A request with no entry means "use the fallback".
#[derive(Debug, Clone, Default)]
pub struct ImageSet {
    images: HashMap<ImageKey, Arc<ResolvedImage>>,
}

impl ImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, request: &ImageRequest, image: ResolvedImage) {
        self.images.insert(request.key(), Arc::new(image));
    }

    pub fn get(&self, request: &ImageRequest) -> Option<Arc<ResolvedImage>> {
        self.images.get(&request.key()).cloned()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

fn encode_pixels<S: Serializer>(pixels: &SharedData, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(pixels.as_slice()))
}

fn decode_pixels<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SharedData, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    STANDARD
        .decode(encoded.as_bytes())
        .map(Arc::new)
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixels_travel_as_base64() {
        let image = ResolvedImage::new("https://x/a.png", 1, 1, vec![255, 0, 0], Size::new(2.0, 2.0));
        assert!(image.is_consistent());
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["pixels"], "/wAA");
        let back: ResolvedImage = serde_json::from_value(json).unwrap();
        assert_eq!(back.pixels.as_slice(), &[255, 0, 0]);
    }

    #[test]
    fn test_image_set_is_keyed_by_url_and_box() {
        let mut set = ImageSet::new();
        let small = ImageRequest::new("https://x/a.png", 20.0, 15.0);
        let large = ImageRequest::new("https://x/a.png", 50.0, 40.0);
        set.insert(&small, ResolvedImage::new("https://x/a.png", 1, 1, vec![0, 0, 0], Size::new(15.0, 15.0)));

        assert!(set.get(&small).is_some());
        assert!(set.get(&ImageRequest::new("https://x/a.png", 20.0, 15.0001)).is_some());
        assert!(set.get(&large).is_none());
        assert_eq!(set.len(), 1);
    }
}
