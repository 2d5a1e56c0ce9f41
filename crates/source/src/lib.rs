//! Catalog implementations.
//!
//! - [`InMemoryCatalog`]: a snapshot loaded from JSON, the offline stand-in for
//!   the product database
//! - [`CachedCatalog`]: read-through memoization over any other catalog
//!
//! ## Example
//!
//! ```ignore
//! use specsheet_source::{CachedCatalog, InMemoryCatalog};
//!
//! let catalog = CachedCatalog::new(InMemoryCatalog::from_path("catalog.json")?);
//! let variants = catalog.get_variants(ProductId::new(1))?;
//! ```

mod cached;
mod memory;
mod snapshot;

pub use cached::CachedCatalog;
pub use memory::InMemoryCatalog;
pub use snapshot::CatalogSnapshot;
