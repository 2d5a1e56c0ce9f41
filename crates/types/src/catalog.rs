//! Catalog records as the catalog service returns them.
//!
//! Records are read-only snapshots. Fields a catalog row may legitimately omit
//! are either `Option` or backfilled with a default during deserialization,
//! so downstream code never has to guess at a missing key.

use crate::Money;
use crate::ids::{AccessoryId, AssetId, CategoryId, FeatureId, OptionId, ProductId, VariantId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub base_part_code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub product_image_url: Option<String>,
    #[serde(default)]
    pub dimension_image_url: Option<String>,
}

/// A purchasable tier of a product with fixed photometric figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default, alias = "variant_name")]
    pub name: String,
    #[serde(default)]
    pub part_code_suffix: String,
    /// Luminous output in lumens.
    #[serde(default, alias = "system_output")]
    pub output: f64,
    /// Electrical power in watts.
    #[serde(default, alias = "system_power")]
    pub power: f64,
    /// Efficacy in lumens per watt.
    #[serde(default)]
    pub efficiency: Option<f64>,
    /// Free-form extra figures (`tunable_range`, `system_output`, ...).
    #[serde(default)]
    pub specifications: BTreeMap<String, Value>,
    #[serde(default, alias = "base_price")]
    pub price: Money,
    #[serde(default)]
    pub display_order: i32,
}

impl Variant {
    /// Reads a numeric entry from `specifications`, accepting numbers and numeric strings.
    pub fn spec_number(&self, key: &str) -> Option<f64> {
        match self.specifications.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Reads a textual entry from `specifications`.
    pub fn spec_text(&self, key: &str) -> Option<String> {
        match self.specifications.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// One selectable value inside a configuration category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigOption {
    pub id: OptionId,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub option_value: String,
    #[serde(default)]
    pub option_label: String,
    #[serde(default)]
    pub part_code_suffix: String,
    #[serde(default)]
    pub price_modifier: Money,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default, alias = "image_url")]
    pub option_image_url: Option<String>,
}

/// A named axis of customization and the options it offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationCategory {
    pub id: CategoryId,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub section_name: Option<String>,
    #[serde(default)]
    pub section_label: Option<String>,
    pub category_name: String,
    #[serde(default)]
    pub category_label: Option<String>,
    /// Slot of this category's suffix in the part code. Zero or less means "not encoded".
    #[serde(default)]
    pub part_code_position: i32,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub options: Vec<ConfigOption>,
}

impl ConfigurationCategory {
    pub fn label(&self) -> &str {
        self.category_label
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(&self.category_name)
    }

    pub fn option(&self, id: OptionId) -> Option<&ConfigOption> {
        self.options.iter().find(|o| o.id == id)
    }

    pub fn default_option(&self) -> Option<&ConfigOption> {
        self.options.iter().find(|o| o.is_default)
    }
}

/// An accessory after normalization. Every field has a concrete value.
///
/// Deserialization goes through [`RawAccessory`], so a catalog row with
/// missing `image_url`, `price`, `is_active` or `accessory_category` still
/// produces a complete record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAccessory")]
pub struct Accessory {
    pub id: AccessoryId,
    pub product_id: Option<ProductId>,
    pub name: String,
    pub part_code: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Money,
    pub is_active: bool,
    pub display_order: i32,
    pub accessory_category: String,
}

pub const DEFAULT_ACCESSORY_CATEGORY: &str = "General";

/// An accessory row exactly as a catalog may deliver it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawAccessory {
    pub id: AccessoryId,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub part_code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default)]
    pub accessory_category: Option<String>,
}

impl Accessory {
    /// Builds a complete record from a possibly partial row. Pure: the input is consumed
    /// and a new value is returned.
    pub fn normalize(raw: RawAccessory) -> Self {
        Self {
            id: raw.id,
            product_id: raw.product_id,
            name: raw.name.unwrap_or_default(),
            part_code: raw.part_code.unwrap_or_default(),
            description: raw.description.filter(|d| !d.trim().is_empty()),
            image_url: raw.image_url.filter(|u| !u.trim().is_empty()),
            price: raw.price.unwrap_or_default(),
            is_active: raw.is_active.unwrap_or(true),
            display_order: raw.display_order.unwrap_or(0),
            accessory_category: raw
                .accessory_category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ACCESSORY_CATEGORY.to_string()),
        }
    }
}

impl From<RawAccessory> for Accessory {
    fn from(raw: RawAccessory) -> Self {
        Accessory::normalize(raw)
    }
}

/// A descriptive attribute of a product ("Material: Die-cast aluminium").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFeature {
    #[serde(default)]
    pub id: Option<FeatureId>,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub feature_type: String,
    #[serde(default)]
    pub feature_label: String,
    #[serde(default)]
    pub feature_value: String,
    #[serde(default)]
    pub feature_icon_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualAsset {
    pub id: AssetId,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub asset_type: String,
    #[serde(default)]
    pub asset_category: String,
    pub file_url: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub display_order: i32,
    /// Global assets apply to every product (e.g. certification marks).
    #[serde(default)]
    pub is_global: bool,
}

impl VisualAsset {
    pub fn is_certification(&self) -> bool {
        self.asset_type.eq_ignore_ascii_case("certification")
    }
}

/// Visual assets partitioned by role.
///
/// Every asset is in `all_assets`; each asset additionally lands in at most one
/// of the three role buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualAssetBuckets {
    #[serde(default)]
    pub certifications: Vec<VisualAsset>,
    #[serde(default)]
    pub product_images: Vec<VisualAsset>,
    #[serde(default)]
    pub dimension_images: Vec<VisualAsset>,
    #[serde(default)]
    pub all_assets: Vec<VisualAsset>,
}

impl VisualAssetBuckets {
    /// Partitions assets in a single pass. Certification type is checked first,
    /// then the category text: "product" before "dimension".
    pub fn classify(assets: Vec<VisualAsset>) -> Self {
        let mut buckets = VisualAssetBuckets::default();
        for asset in &assets {
            let category = asset.asset_category.to_lowercase();
            if asset.is_certification() {
                buckets.certifications.push(asset.clone());
            } else if category.contains("product") {
                buckets.product_images.push(asset.clone());
            } else if category.contains("dimension") {
                buckets.dimension_images.push(asset.clone());
            }
        }
        buckets.all_assets = assets;
        buckets
    }

    pub fn is_empty(&self) -> bool {
        self.all_assets.is_empty()
            && self.certifications.is_empty()
            && self.product_images.is_empty()
            && self.dimension_images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn asset(id: i64, asset_type: &str, category: &str) -> VisualAsset {
        VisualAsset {
            id: AssetId(id),
            product_id: None,
            asset_type: asset_type.to_string(),
            asset_category: category.to_string(),
            file_url: format!("https://cdn.example.com/{id}.png"),
            file_name: format!("{id}.png"),
            display_order: 0,
            is_global: false,
        }
    }

    #[test]
    fn test_classify_uses_fixed_rule_order() {
        let assets = vec![
            asset(1, "certification", "product badge"),
            asset(2, "image", "Product Photo"),
            asset(3, "image", "dimension drawing"),
            asset(4, "image", "product dimension sheet"),
            asset(5, "image", "lifestyle"),
        ];
        let buckets = VisualAssetBuckets::classify(assets);

        let ids = |v: &[VisualAsset]| v.iter().map(|a| a.id.0).collect::<Vec<_>>();
        assert_eq!(ids(&buckets.certifications), vec![1]);
        assert_eq!(ids(&buckets.product_images), vec![2, 4]);
        assert_eq!(ids(&buckets.dimension_images), vec![3]);
        assert_eq!(buckets.all_assets.len(), 5);
    }

    #[test]
    fn test_accessory_backfills_missing_fields() {
        let accessory: Accessory = serde_json::from_value(json!({
            "id": 3,
            "name": "Snoot",
            "part_code": "ACC-SN"
        }))
        .unwrap();

        assert_eq!(accessory.image_url, None);
        assert_eq!(accessory.price, Money::ZERO);
        assert!(accessory.is_active);
        assert_eq!(accessory.display_order, 0);
        assert_eq!(accessory.accessory_category, DEFAULT_ACCESSORY_CATEGORY);
    }

    #[test]
    fn test_accessory_keeps_present_fields() {
        let accessory: Accessory = serde_json::from_value(json!({
            "id": 4,
            "name": "Honeycomb louvre",
            "part_code": "ACC-HL",
            "price": 12.5,
            "is_active": false,
            "accessory_category": "Optics",
            "image_url": "https://cdn.example.com/hl.png"
        }))
        .unwrap();

        assert_eq!(accessory.price, Money::new(125, 1));
        assert!(!accessory.is_active);
        assert_eq!(accessory.accessory_category, "Optics");
        assert_eq!(accessory.image_url.as_deref(), Some("https://cdn.example.com/hl.png"));
    }

    #[test]
    fn test_variant_accepts_catalog_column_names() {
        let variant: Variant = serde_json::from_value(json!({
            "id": 1,
            "variant_name": "9W",
            "part_code_suffix": "9W",
            "system_output": 945,
            "system_power": 9,
            "efficiency": 105,
            "base_price": 42.1,
            "specifications": {"tunable_range": "2700K~6500K", "led_output": "1100"}
        }))
        .unwrap();

        assert_eq!(variant.name, "9W");
        assert_eq!(variant.output, 945.0);
        assert_eq!(variant.power, 9.0);
        assert_eq!(variant.price, Money::new(421, 1));
        assert_eq!(variant.spec_text("tunable_range").as_deref(), Some("2700K~6500K"));
        assert_eq!(variant.spec_number("led_output"), Some(1100.0));
    }

    #[test]
    fn test_category_label_falls_back_to_name() {
        let category: ConfigurationCategory = serde_json::from_value(json!({
            "id": 1,
            "category_name": "Beam Angle",
            "category_label": ""
        }))
        .unwrap();
        assert_eq!(category.label(), "Beam Angle");
    }
}
