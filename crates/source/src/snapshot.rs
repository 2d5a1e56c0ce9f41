use serde::{Deserialize, Serialize};
use specsheet_types::{
    Accessory, ConfigOption, ConfigurationCategory, Product, ProductFeature, Variant, VisualAsset,
};

/// The serialized form of a whole catalog.
///
/// Options may be nested in their category or listed flat under
/// `configuration_options`; flat options are attached by `category_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub configuration_categories: Vec<ConfigurationCategory>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub configuration_options: Vec<ConfigOption>,
    #[serde(default)]
    pub accessories: Vec<Accessory>,
    #[serde(default)]
    pub features: Vec<ProductFeature>,
    #[serde(default)]
    pub visual_assets: Vec<VisualAsset>,
}

impl CatalogSnapshot {
    /// Moves flat options into their categories. Options naming an unknown category are dropped.
    pub(crate) fn attach_options(&mut self) {
        for option in std::mem::take(&mut self.configuration_options) {
            let Some(category_id) = option.category_id else {
                log::warn!("Dropping option {} without a category", option.id);
                continue;
            };
            match self
                .configuration_categories
                .iter_mut()
                .find(|c| c.id == category_id)
            {
                Some(category) => category.options.push(option),
                None => log::warn!("Dropping option {} of unknown category {category_id}", option.id),
            }
        }
        for category in &mut self.configuration_categories {
            category.options.sort_by_key(|o| o.display_order);
        }
    }
}
