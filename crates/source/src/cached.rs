use specsheet_traits::{Catalog, CatalogError};
use specsheet_types::{
    Accessory, ConfigurationCategory, Product, ProductFeature, ProductId, Variant, VisualAsset,
};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;

#[derive(Debug)]
struct Memo<K, V> {
    entries: RwLock<HashMap<K, V>>,
}

impl<K: Eq + Hash, V: Clone> Memo<K, V> {
    fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn get_or_load(
        &self,
        key: K,
        load: impl FnOnce() -> Result<V, CatalogError>,
    ) -> Result<V, CatalogError> {
        if let Ok(entries) = self.entries.read()
            && let Some(hit) = entries.get(&key)
        {
            return Ok(hit.clone());
        }
        let value = load()?;
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, value.clone());
        }
        Ok(value)
    }

    fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

/// Read-through cache in front of another catalog.
///
/// Successful answers, including empty ones, are remembered until
/// [`CachedCatalog::invalidate`]. Errors are never cached.
#[derive(Debug)]
pub struct CachedCatalog<C> {
    inner: C,
    products: Memo<ProductId, Option<Product>>,
    variants: Memo<ProductId, Vec<Variant>>,
    categories: Memo<ProductId, Vec<ConfigurationCategory>>,
    accessories: Memo<ProductId, Vec<Accessory>>,
    assets: Memo<(ProductId, bool), Vec<VisualAsset>>,
    features: Memo<ProductId, Vec<ProductFeature>>,
    names: Memo<String, Option<Product>>,
}

impl<C: Catalog> CachedCatalog<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            products: Memo::new(),
            variants: Memo::new(),
            categories: Memo::new(),
            accessories: Memo::new(),
            assets: Memo::new(),
            features: Memo::new(),
            names: Memo::new(),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn invalidate(&self) {
        self.products.clear();
        self.variants.clear();
        self.categories.clear();
        self.accessories.clear();
        self.assets.clear();
        self.features.clear();
        self.names.clear();
        log::debug!("Cleared cached catalog over {}", self.inner.name());
    }
}

impl<C: Catalog> Catalog for CachedCatalog<C> {
    fn get_product(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        self.products.get_or_load(id, || self.inner.get_product(id))
    }

    fn get_variants(&self, product_id: ProductId) -> Result<Vec<Variant>, CatalogError> {
        self.variants
            .get_or_load(product_id, || self.inner.get_variants(product_id))
    }

    fn get_configuration_categories(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ConfigurationCategory>, CatalogError> {
        self.categories.get_or_load(product_id, || {
            self.inner.get_configuration_categories(product_id)
        })
    }

    fn get_accessories(&self, product_id: ProductId) -> Result<Vec<Accessory>, CatalogError> {
        self.accessories
            .get_or_load(product_id, || self.inner.get_accessories(product_id))
    }

    fn get_visual_assets(
        &self,
        product_id: ProductId,
        include_global: bool,
    ) -> Result<Vec<VisualAsset>, CatalogError> {
        self.assets.get_or_load((product_id, include_global), || {
            self.inner.get_visual_assets(product_id, include_global)
        })
    }

    fn get_features(&self, product_id: ProductId) -> Result<Vec<ProductFeature>, CatalogError> {
        self.features
            .get_or_load(product_id, || self.inner.get_features(product_id))
    }

    fn find_product_by_name(&self, name: &str) -> Result<Option<Product>, CatalogError> {
        self.names.get_or_load(name.trim().to_lowercase(), || {
            self.inner.find_product_by_name(name)
        })
    }

    fn name(&self) -> &'static str {
        "CachedCatalog"
    }
}
