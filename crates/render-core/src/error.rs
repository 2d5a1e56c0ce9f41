use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF generation error: {0}")]
    Pdf(String),
    #[error("Failed to serialize the layout tree: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Rendering exceeded its time limit of {0:?}")]
    Timeout(Duration),
    #[error("Rendering was cancelled")]
    Cancelled,
    #[error("External renderer failed: {0}")]
    Process(String),
    #[error("Other rendering error: {0}")]
    Other(String),
}

impl RenderError {
    /// True for the two ways a render can be stopped from outside.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, RenderError::Timeout(_) | RenderError::Cancelled)
    }
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        RenderError::Pdf(err.to_string())
    }
}

impl From<&str> for RenderError {
    fn from(s: &str) -> Self {
        RenderError::Other(s.to_string())
    }
}
