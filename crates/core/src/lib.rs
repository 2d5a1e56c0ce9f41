//! The datasheet composition engine.
//!
//! - [`fields`]: resolves every documented field to a concrete value
//! - [`variant`]: picks the variant a document is rendered for
//! - [`pricing`]: part codes and price quotes
//! - [`composer`]: turns resolved data into a [`specsheet_idf::LayoutTree`]
//!
//! Everything in this crate is synchronous, deterministic and infallible.
//! Fetching and rendering live elsewhere.

pub mod composer;
pub mod fields;
pub mod pricing;
pub mod variant;

pub use composer::{ComposeInput, DefaultAssets, LayoutComposer, LayoutOptions};
pub use fields::{Dimensions, FieldDefaults, FieldResolver, FieldSource, Resolved, ResolvedFields};
pub use pricing::{PriceQuote, compute_price, display_part_code, part_code, variant_part_code};
pub use variant::{efficiency, fallback_variant, resolve_variant, select_variant};
