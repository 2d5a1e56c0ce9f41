pub mod catalog;
pub mod executor;
pub mod resource;

pub use catalog::{Catalog, CatalogError, EmptyCatalog};
pub use executor::{Executor, SyncExecutor};
pub use resource::{InMemoryResourceProvider, ResourceError, ResourceProvider, SharedResourceData};
