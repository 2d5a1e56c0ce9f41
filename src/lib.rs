//! Product datasheet generation.
//!
//! A [`ConfigurationRequest`] describes one configured product. The
//! [`DatasheetService`] enriches it from a [`Catalog`], resolves every
//! printed field, composes a layout tree and hands it to a
//! [`DocumentRenderer`].
//!
//! ```no_run
//! use specsheet::{ConfigurationRequest, DatasheetService, ServiceConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServiceConfig::load(None)?;
//! let service = DatasheetService::from_config(&config)?;
//! let request = ConfigurationRequest::from_json(&std::fs::read_to_string("request.json")?)?;
//! let datasheet = service.generate(request)?;
//! std::fs::write(&datasheet.filename, &datasheet.bytes)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod service;

pub use config::{CatalogConfig, ConfigError, FetchConfig, RenderBackend, RenderConfig, ServiceConfig};
pub use error::{DatasheetError, ErrorCategory, Stage};
pub use service::{
    DatasheetService, DatasheetServiceBuilder, GeneratedDatasheet, PDF_CONTENT_TYPE, datasheet_filename,
};

pub use specsheet_core::{DefaultAssets, FieldDefaults, LayoutOptions, PriceQuote};
pub use specsheet_executor::ExecutorImpl;
pub use specsheet_idf::LayoutTree;
pub use specsheet_render_core::{
    CancellationFlag, CommandRenderer, CommandSpec, DocumentRenderer, RenderContext, RenderError,
    RenderedDocument,
};
pub use specsheet_render_lopdf::LopdfRenderer;
pub use specsheet_source::{CachedCatalog, CatalogSnapshot, InMemoryCatalog};
pub use specsheet_traits::{Catalog, CatalogError, EmptyCatalog, InMemoryResourceProvider, ResourceProvider};
pub use specsheet_types::{ConfigurationRequest, ProductSelection, ValidationError};
