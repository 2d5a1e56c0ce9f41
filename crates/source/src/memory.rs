use crate::snapshot::CatalogSnapshot;
use specsheet_traits::{Catalog, CatalogError};
use specsheet_types::{
    Accessory, ConfigurationCategory, Product, ProductFeature, ProductId, Variant, VisualAsset,
};
use std::path::Path;

/// A catalog held entirely in memory.
///
/// Mirrors the filtering and ordering of the product database: inactive
/// accessories are hidden and every list comes back in `display_order`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    snapshot: CatalogSnapshot,
}

impl InMemoryCatalog {
    pub fn new(mut snapshot: CatalogSnapshot) -> Self {
        snapshot.attach_options();
        Self { snapshot }
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let snapshot: CatalogSnapshot = serde_json::from_str(json)
            .map_err(|e| CatalogError::InvalidData(format!("catalog snapshot: {e}")))?;
        Ok(Self::new(snapshot))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Unavailable(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }
}

fn sorted<T: Clone>(items: impl Iterator<Item = T>, key: impl Fn(&T) -> i32) -> Vec<T> {
    let mut out: Vec<T> = items.collect();
    out.sort_by_key(|item| key(item));
    out
}

impl Catalog for InMemoryCatalog {
    fn get_product(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        Ok(self.snapshot.products.iter().find(|p| p.id == id).cloned())
    }

    fn get_variants(&self, product_id: ProductId) -> Result<Vec<Variant>, CatalogError> {
        Ok(sorted(
            self.snapshot
                .variants
                .iter()
                .filter(|v| v.product_id == Some(product_id))
                .cloned(),
            |v| v.display_order,
        ))
    }

    fn get_configuration_categories(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ConfigurationCategory>, CatalogError> {
        Ok(sorted(
            self.snapshot
                .configuration_categories
                .iter()
                .filter(|c| c.product_id == Some(product_id))
                .cloned(),
            |c| c.display_order,
        ))
    }

    fn get_accessories(&self, product_id: ProductId) -> Result<Vec<Accessory>, CatalogError> {
        Ok(sorted(
            self.snapshot
                .accessories
                .iter()
                .filter(|a| a.product_id == Some(product_id) && a.is_active)
                .cloned(),
            |a| a.display_order,
        ))
    }

    fn get_visual_assets(
        &self,
        product_id: ProductId,
        include_global: bool,
    ) -> Result<Vec<VisualAsset>, CatalogError> {
        Ok(sorted(
            self.snapshot
                .visual_assets
                .iter()
                .filter(|a| a.product_id == Some(product_id) || (include_global && a.is_global))
                .cloned(),
            |a| a.display_order,
        ))
    }

    fn get_features(&self, product_id: ProductId) -> Result<Vec<ProductFeature>, CatalogError> {
        Ok(sorted(
            self.snapshot
                .features
                .iter()
                .filter(|f| f.product_id == Some(product_id))
                .cloned(),
            |f| f.display_order,
        ))
    }

    fn find_product_by_name(&self, name: &str) -> Result<Option<Product>, CatalogError> {
        let wanted = name.trim();
        Ok(self
            .snapshot
            .products
            .iter()
            .find(|p| p.name.trim().eq_ignore_ascii_case(wanted))
            .cloned())
    }

    fn name(&self) -> &'static str {
        "InMemoryCatalog"
    }
}
