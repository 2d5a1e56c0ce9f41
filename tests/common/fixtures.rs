use image::{ImageFormat, Rgb, RgbImage};
use serde_json::{Value, json};
use specsheet::{
    ConfigurationRequest, DatasheetService, ExecutorImpl, InMemoryCatalog, InMemoryResourceProvider,
};
use std::io::Cursor;
use std::sync::Arc;

pub const PRODUCT_IMAGE: &str = "https://cdn.example.com/regulus/product.png";
pub const DIMENSION_IMAGE: &str = "https://cdn.example.com/regulus/dimensions.png";
pub const BEAM_IMAGE: &str = "https://cdn.example.com/regulus/beam-36.png";
pub const CLIP_IMAGE: &str = "https://cdn.example.com/accessories/clip.png";
pub const CE_MARK: &str = "https://cdn.example.com/global/ce-mark.png";
pub const UKCA_MARK: &str = "https://cdn.example.com/global/ukca-mark.png";

/// A solid-colour PNG.
pub fn png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb(rgb));
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .expect("encoding a PNG into memory");
    out.into_inner()
}

/// Serves every fixture image URL.
pub fn image_provider() -> Arc<InMemoryResourceProvider> {
    Arc::new(
        InMemoryResourceProvider::new()
            .with(PRODUCT_IMAGE, png(400, 300, [200, 200, 200]))
            .with(DIMENSION_IMAGE, png(300, 200, [30, 30, 30]))
            .with(BEAM_IMAGE, png(800, 400, [139, 195, 74]))
            .with(CLIP_IMAGE, png(64, 64, [90, 90, 90]))
            .with(CE_MARK, png(60, 45, [0, 0, 0]))
            .with(UKCA_MARK, png(60, 45, [0, 0, 128])),
    )
}

pub fn variants() -> Value {
    json!([
        {
            "id": 11, "product_id": 7, "name": "9W", "part_code_suffix": "9W",
            "output": 945, "power": 9, "efficiency": 105, "base_price": "120.00",
            "specifications": {"tunable_range": "2700K~4000K"}, "display_order": 1
        },
        {
            "id": 12, "product_id": 7, "name": "12W", "part_code_suffix": "12W",
            "output": 1260, "power": 12, "base_price": "135.00", "display_order": 2
        }
    ])
}

pub fn categories() -> Value {
    json!([
        {
            "id": 1, "product_id": 7, "category_name": "Beam Angle",
            "part_code_position": 1, "is_required": true, "display_order": 2,
            "options": [
                {"id": 101, "option_value": "36", "option_label": "36°", "part_code_suffix": "36",
                 "price_modifier": "5.00", "option_image_url": BEAM_IMAGE, "display_order": 1},
                {"id": 102, "option_value": "24", "option_label": "24°", "part_code_suffix": "24",
                 "price_modifier": "5.00", "is_default": true, "display_order": 2}
            ]
        },
        {
            "id": 2, "product_id": 7, "category_name": "Colour Temperature",
            "part_code_position": 2, "is_required": true, "display_order": 1,
            "options": [
                {"id": 201, "option_value": "3000", "option_label": "3000K", "part_code_suffix": "30K"},
                {"id": 202, "option_value": "4000", "option_label": "4000K", "part_code_suffix": "40K",
                 "price_modifier": "2.50", "is_default": true}
            ]
        },
        {
            "id": 3, "product_id": 7, "category_name": "Finish",
            "part_code_position": 0, "is_required": false, "display_order": 3,
            "options": [
                {"id": 301, "option_value": "black", "option_label": "Matt Black", "price_modifier": "3.00"}
            ]
        }
    ])
}

pub fn product() -> Value {
    json!({
        "id": 7, "name": "Regulus Alpha", "base_part_code": "LY-DL-RUA",
        "product_image_url": PRODUCT_IMAGE, "dimension_image_url": DIMENSION_IMAGE
    })
}

/// The 12W Regulus Alpha with a 36° beam, 3000K and one clip.
/// Part code `LY-DL-RUA-12W-36-30K`, price 144.50.
pub fn request_json() -> Value {
    json!({
        "product_name": "Regulus Alpha",
        "base_part_code": "LY-DL-RUA",
        "variants": variants(),
        "selected_variant_id": 12,
        "configuration_categories": categories(),
        "selected_options": {
            "Beam Angle": {"id": 101, "option_label": "36°", "part_code_suffix": "36",
                           "price_modifier": "5.00", "option_image_url": BEAM_IMAGE},
            "Colour Temperature": {"id": 201, "option_label": "3000K", "part_code_suffix": "30K"}
        },
        "accessories": [
            {"id": 1, "name": "Recess Clip", "part_code": "ACC-CLIP", "price": "4.50", "image_url": CLIP_IMAGE}
        ],
        "product": product()
    })
}

pub fn request() -> ConfigurationRequest {
    ConfigurationRequest::from_value(request_json()).expect("fixture request is valid")
}

/// A request with nothing but the required fields.
pub fn bare_request() -> ConfigurationRequest {
    ConfigurationRequest::from_value(json!({
        "product_name": "Vega Trim",
        "base_part_code": "LY-VT",
        "variants": []
    }))
    .expect("bare request is valid")
}

pub fn snapshot_json() -> Value {
    json!({
        "products": [product(), {"id": 8, "name": "Vega Trim", "base_part_code": "LY-VT"}],
        "variants": variants(),
        "configuration_categories": categories(),
        "accessories": [
            {"id": 1, "product_id": 7, "name": "Recess Clip", "part_code": "ACC-CLIP",
             "price": "4.50", "image_url": CLIP_IMAGE, "display_order": 1},
            {"id": 2, "product_id": 7, "name": "Trim Ring", "part_code": "ACC-RING",
             "price": "8.00", "display_order": 2},
            {"id": 3, "product_id": 7, "name": "Retired Lens", "is_active": false}
        ],
        "features": [
            {"product_id": 7, "feature_type": "construction", "feature_label": "Housing Material",
             "feature_value": "Die-cast Aluminium"}
        ],
        "visual_assets": [
            {"id": 1, "asset_type": "certification", "file_url": CE_MARK,
             "file_name": "ce-mark.png", "is_global": true, "display_order": 1},
            {"id": 2, "product_id": 7, "asset_type": "certification", "file_url": UKCA_MARK,
             "file_name": "ukca-mark.png", "display_order": 2},
            {"id": 3, "product_id": 7, "asset_type": "image", "asset_category": "product photo",
             "file_url": PRODUCT_IMAGE}
        ]
    })
}

pub fn catalog() -> Arc<InMemoryCatalog> {
    Arc::new(InMemoryCatalog::from_json(&snapshot_json().to_string()).expect("fixture catalog is valid"))
}

/// A service over the fixture catalog and images, uncompressed so content streams are readable.
pub fn service() -> DatasheetService {
    DatasheetService::builder()
        .with_catalog(catalog())
        .with_resource_provider(image_provider())
        .with_executor(ExecutorImpl::bounded(4))
        .with_renderer(Arc::new(specsheet::LopdfRenderer::uncompressed()))
        .build()
}
