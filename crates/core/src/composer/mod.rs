//! Builds the [`LayoutTree`] of a datasheet.
//!
//! Composition runs in two passes. [`LayoutComposer::image_requests`] lists
//! every image the document could show; the caller fetches them (in any
//! order, on any executor) into an [`ImageSet`]. [`LayoutComposer::compose`]
//! then builds the tree, falling back to text wherever an image is missing.
//! Both passes are pure functions of their input.

mod assets;
mod sections;

pub use assets::{DefaultAssets, LayoutOptions};

use crate::fields::{ResolvedFields, category};
use itertools::Itertools;
use specsheet_idf::{ImageRequest, ImageSet, LayoutTree};
use specsheet_types::{
    Accessory, ConfigurationRequest, Variant, VisualAsset, VisualAssetBuckets,
};

/// Maximum image boxes, width by height in millimetres.
pub mod boxes {
    pub const LOGO: (f32, f32) = (60.0, 14.0);
    pub const PRODUCT: (f32, f32) = (50.0, 40.0);
    pub const CERTIFICATION: (f32, f32) = (20.0, 15.0);
    pub const DIMENSION: (f32, f32) = (45.0, 35.0);
    pub const LIGHT_DISTRIBUTION: (f32, f32) = (80.0, 50.0);
    pub const ACCESSORY: (f32, f32) = (25.0, 20.0);
    pub const FOOTER_LOGO: (f32, f32) = (35.0, 8.0);
}

static NO_ASSETS: VisualAssetBuckets = VisualAssetBuckets {
    certifications: Vec::new(),
    product_images: Vec::new(),
    dimension_images: Vec::new(),
    all_assets: Vec::new(),
};

/// Everything a datasheet is composed from. Fields and variant must already be resolved.
#[derive(Debug, Clone, Copy)]
pub struct ComposeInput<'a> {
    pub request: &'a ConfigurationRequest,
    pub fields: &'a ResolvedFields,
    pub variant: &'a Variant,
    pub accessories: &'a [Accessory],
    pub visual_assets: &'a VisualAssetBuckets,
}

impl<'a> ComposeInput<'a> {
    pub fn new(request: &'a ConfigurationRequest, fields: &'a ResolvedFields, variant: &'a Variant) -> Self {
        Self {
            request,
            fields,
            variant,
            accessories: &request.accessories,
            visual_assets: request.visual_assets.as_ref().unwrap_or(&NO_ASSETS),
        }
    }

    fn product_image_url(&self) -> Option<&'a str> {
        self.request
            .product
            .as_ref()
            .and_then(|p| non_empty(p.product_image_url.as_deref()))
            .or_else(|| first_url(&self.visual_assets.product_images))
    }

    fn dimension_image_url(&self) -> Option<&'a str> {
        self.request
            .product
            .as_ref()
            .and_then(|p| non_empty(p.dimension_image_url.as_deref()))
            .or_else(|| first_url(&self.visual_assets.dimension_images))
    }

    fn beam_image_url(&self) -> Option<&'a str> {
        category::BEAM_ANGLE
            .iter()
            .filter_map(|name| self.request.selected_option(name))
            .find_map(|option| option.image_url())
    }

    fn certifications(&self) -> &'a [VisualAsset] {
        &self.visual_assets.certifications
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn first_url(assets: &[VisualAsset]) -> Option<&str> {
    assets.iter().find_map(|a| non_empty(Some(a.file_url.as_str())))
}

#[derive(Debug, Clone, Default)]
pub struct LayoutComposer {
    assets: DefaultAssets,
    options: LayoutOptions,
}

impl LayoutComposer {
    pub fn new(assets: DefaultAssets, options: LayoutOptions) -> Self {
        Self { assets, options }
    }

    pub fn assets(&self) -> &DefaultAssets {
        &self.assets
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// True if the accessory list fits the display budget. Over budget the
    /// section is dropped, never truncated.
    pub fn shows_accessories(&self, accessories: &[Accessory]) -> bool {
        accessories.len() <= self.options.accessory_budget
    }

    /// Every image [`LayoutComposer::compose`] may place, without duplicates.
    pub fn image_requests(&self, input: &ComposeInput<'_>) -> Vec<ImageRequest> {
        let request = |url: &str, (w, h): (f32, f32)| ImageRequest::new(url, w, h);
        let mut out = Vec::new();

        if let Some(url) = non_empty(self.assets.logo_url.as_deref()) {
            out.push(request(url, boxes::LOGO));
        }
        if let Some(url) = input.product_image_url() {
            out.push(request(url, boxes::PRODUCT));
        }
        for cert in input.certifications() {
            if let Some(url) = non_empty(Some(cert.file_url.as_str())) {
                out.push(request(url, boxes::CERTIFICATION));
            }
        }
        if let Some(url) = input.dimension_image_url() {
            out.push(request(url, boxes::DIMENSION));
        }
        if let Some(url) = input.beam_image_url() {
            out.push(request(url, boxes::LIGHT_DISTRIBUTION));
        }
        if self.shows_accessories(input.accessories) {
            for accessory in input.accessories {
                if let Some(url) = non_empty(accessory.image_url.as_deref()) {
                    out.push(request(url, boxes::ACCESSORY));
                }
            }
        }
        if let Some(url) = non_empty(self.assets.footer_logo_url.as_deref()) {
            out.push(request(url, boxes::FOOTER_LOGO));
        }

        out.into_iter().unique_by(|r| r.key()).collect()
    }

    /// Builds the tree. Never fails: every panel has a textual fallback.
    pub fn compose(&self, input: &ComposeInput<'_>, images: &ImageSet) -> LayoutTree {
        let composition = sections::Composition {
            input,
            images,
            assets: &self.assets,
            options: &self.options,
        };

        let mut sections = vec![
            composition.header(),
            composition.title(),
            composition.image_triplet(),
            composition.specifications(),
            composition.customizable_specifications(),
            composition.light_distribution(),
        ];
        if self.shows_accessories(input.accessories) {
            sections.push(composition.accessories());
        } else {
            log::debug!(
                "Omitting accessories section: {} accessories exceed budget of {}",
                input.accessories.len(),
                self.options.accessory_budget
            );
        }
        sections.push(composition.certifications());
        sections.push(composition.footer());
        LayoutTree::new(sections)
    }
}
