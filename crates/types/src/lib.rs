pub mod catalog;
pub mod color;
pub mod geometry;
pub mod ids;
pub mod request;

pub use catalog::{
    Accessory, ConfigOption, ConfigurationCategory, DEFAULT_ACCESSORY_CATEGORY, Product,
    ProductFeature, RawAccessory, Variant, VisualAsset, VisualAssetBuckets,
};
pub use color::Color;
pub use geometry::Size;
pub use ids::{AccessoryId, AssetId, CategoryId, FeatureId, OptionId, ProductId, VariantId};
pub use request::{ConfigurationRequest, ProductSelection, SelectedOption, ValidationError};

/// Money amounts are exact decimals so sums do not depend on summation order.
pub type Money = rust_decimal::Decimal;
