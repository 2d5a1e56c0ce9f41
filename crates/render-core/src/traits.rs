use crate::context::RenderContext;
use crate::error::RenderError;
use specsheet_idf::LayoutTree;
use specsheet_style::Stylesheet;
use std::fmt::Debug;

/// The bytes of a finished document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    /// Known for in-process backends; external programs do not report it.
    pub page_count: Option<usize>,
}

impl RenderedDocument {
    pub fn new(bytes: Vec<u8>, page_count: Option<usize>) -> Self {
        Self { bytes, page_count }
    }
}

/// Turns a composed datasheet into final page bytes.
///
/// Implementations treat the tree as read-only and must honour the context:
/// return `RenderError::Cancelled` or `RenderError::Timeout` once it fires,
/// and leave nothing behind (temporary files, child processes) on any path.
///
/// # Implementations
///
/// - `LopdfRenderer` (specsheet-render-lopdf): in-process, fixed-geometry PDF writer
/// - `CommandRenderer`: delegates to an external program
pub trait DocumentRenderer: Send + Sync + Debug {
    fn render(
        &self,
        tree: &LayoutTree,
        stylesheet: &Stylesheet,
        ctx: &RenderContext,
    ) -> Result<RenderedDocument, RenderError>;

    /// Returns a human-readable name for this renderer (for logging/debugging).
    fn name(&self) -> &'static str;
}
