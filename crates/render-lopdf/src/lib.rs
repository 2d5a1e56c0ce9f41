//! Fixed-geometry datasheet PDF renderer using lopdf.
//!
//! The renderer lays each section of a `LayoutTree` out in millimetres,
//! paginates whole sections, repeats the footer on every page and writes the
//! result as an in-memory `lopdf::Document`.

mod layout;
pub mod metrics;
mod page;
mod renderer;

pub use layout::{Draw, LaidOut, LayoutEngine, PageInfo, Rect};
pub use renderer::{LopdfRenderer, paginate};
