//! The read-only catalog the datasheet pipeline consults.
//!
//! Every lookup returns an explicit `Option` or collection. An empty result is
//! a normal answer; `Err` is reserved for the catalog itself being unusable.

use specsheet_types::{
    Accessory, ConfigurationCategory, Product, ProductFeature, ProductId, Variant, VisualAsset,
};
use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    #[error("Catalog query '{query}' failed: {message}")]
    Query { query: String, message: String },

    #[error("Catalog data is invalid: {0}")]
    InvalidData(String),
}

impl CatalogError {
    pub fn query(query: impl Into<String>, message: impl Into<String>) -> Self {
        CatalogError::Query {
            query: query.into(),
            message: message.into(),
        }
    }
}

/// Key-value style access to products and everything hanging off them.
///
/// Implementations must be idempotent: the same call returns the same answer.
pub trait Catalog: Send + Sync + Debug {
    fn get_product(&self, id: ProductId) -> Result<Option<Product>, CatalogError>;

    fn get_variants(&self, product_id: ProductId) -> Result<Vec<Variant>, CatalogError>;

    /// Categories of the product, each with its options.
    fn get_configuration_categories(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ConfigurationCategory>, CatalogError>;

    /// Active accessories of the product.
    fn get_accessories(&self, product_id: ProductId) -> Result<Vec<Accessory>, CatalogError>;

    /// Assets of the product, plus global assets when `include_global` is set.
    fn get_visual_assets(
        &self,
        product_id: ProductId,
        include_global: bool,
    ) -> Result<Vec<VisualAsset>, CatalogError>;

    fn get_features(&self, _product_id: ProductId) -> Result<Vec<ProductFeature>, CatalogError> {
        Ok(Vec::new())
    }

    /// Resolves a product from its display name. Used when a request carries a name only.
    fn find_product_by_name(&self, _name: &str) -> Result<Option<Product>, CatalogError> {
        Ok(None)
    }

    fn name(&self) -> &'static str;
}

impl<C: Catalog + ?Sized> Catalog for Arc<C> {
    fn get_product(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        (**self).get_product(id)
    }

    fn get_variants(&self, product_id: ProductId) -> Result<Vec<Variant>, CatalogError> {
        (**self).get_variants(product_id)
    }

    fn get_configuration_categories(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ConfigurationCategory>, CatalogError> {
        (**self).get_configuration_categories(product_id)
    }

    fn get_accessories(&self, product_id: ProductId) -> Result<Vec<Accessory>, CatalogError> {
        (**self).get_accessories(product_id)
    }

    fn get_visual_assets(
        &self,
        product_id: ProductId,
        include_global: bool,
    ) -> Result<Vec<VisualAsset>, CatalogError> {
        (**self).get_visual_assets(product_id, include_global)
    }

    fn get_features(&self, product_id: ProductId) -> Result<Vec<ProductFeature>, CatalogError> {
        (**self).get_features(product_id)
    }

    fn find_product_by_name(&self, name: &str) -> Result<Option<Product>, CatalogError> {
        (**self).find_product_by_name(name)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// A catalog with no products. Lets the pipeline run on self-contained requests.
#[derive(Debug, Clone, Default)]
pub struct EmptyCatalog;

impl Catalog for EmptyCatalog {
    fn get_product(&self, _id: ProductId) -> Result<Option<Product>, CatalogError> {
        Ok(None)
    }

    fn get_variants(&self, _product_id: ProductId) -> Result<Vec<Variant>, CatalogError> {
        Ok(Vec::new())
    }

    fn get_configuration_categories(
        &self,
        _product_id: ProductId,
    ) -> Result<Vec<ConfigurationCategory>, CatalogError> {
        Ok(Vec::new())
    }

    fn get_accessories(&self, _product_id: ProductId) -> Result<Vec<Accessory>, CatalogError> {
        Ok(Vec::new())
    }

    fn get_visual_assets(
        &self,
        _product_id: ProductId,
        _include_global: bool,
    ) -> Result<Vec<VisualAsset>, CatalogError> {
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "EmptyCatalog"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_catalog_answers_with_nothing() {
        let catalog: Arc<dyn Catalog> = Arc::new(EmptyCatalog);
        let id = ProductId(1);
        assert_eq!(catalog.get_product(id).unwrap(), None);
        assert!(catalog.get_variants(id).unwrap().is_empty());
        assert!(catalog.get_visual_assets(id, true).unwrap().is_empty());
        assert!(catalog.get_features(id).unwrap().is_empty());
        assert_eq!(catalog.find_product_by_name("Regulus Alpha").unwrap(), None);
        assert_eq!(catalog.name(), "EmptyCatalog");
    }

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::query("get_variants(3)", "connection reset");
        assert_eq!(
            err.to_string(),
            "Catalog query 'get_variants(3)' failed: connection reset"
        );
    }
}
