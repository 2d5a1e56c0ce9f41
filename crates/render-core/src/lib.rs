//! Core rendering abstractions for datasheet generation.
//!
//! This crate provides the fundamental types shared by rendering backends:
//! - `DocumentRenderer` trait: a composed `LayoutTree` plus a stylesheet in, PDF bytes out
//! - `RenderContext` and `CancellationFlag` for deadlines and cooperative cancellation
//! - `CommandRenderer`, which hands the tree to an external program
//! - Shared utility functions for font naming and coordinate conversion

mod command;
mod context;
mod error;
mod traits;
pub mod utils;

pub use command::{CommandRenderer, CommandSpec};
pub use context::{CancellationFlag, RenderContext};
pub use error::RenderError;
pub use traits::{DocumentRenderer, RenderedDocument};
