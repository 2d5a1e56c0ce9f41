//! Asset loading for datasheets.
//!
//! - [`HttpResourceProvider`]: bounded-time HTTP(S) fetches
//! - [`AssetResolver`]: fetch, decode and scale an image into a box
//!
//! The in-memory provider from specsheet-traits is re-exported for tests and
//! offline runs.

mod http;
mod resolver;

pub use http::{BROWSER_USER_AGENT, HttpFetchOptions, HttpResourceProvider};
pub use resolver::{AssetResolver, MM_PER_PIXEL, scale_to_fit};

pub use specsheet_traits::InMemoryResourceProvider;
