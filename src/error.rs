use specsheet_render_core::RenderError;
use specsheet_traits::CatalogError;
use specsheet_types::ValidationError;
use std::fmt;
use thiserror::Error;

/// Where a request was in the pipeline when it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Received,
    Enriching,
    Resolving,
    Composing,
    Rendering,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Enriching => "enriching",
            Stage::Resolving => "resolving",
            Stage::Composing => "composing",
            Stage::Rendering => "rendering",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The stable classes of failure a caller can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    NotFound,
    MalformedRequest,
    RenderFailure,
    CatalogUnavailable,
    Cancelled,
}

impl ErrorCategory {
    pub fn code(self) -> &'static str {
        match self {
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::MalformedRequest => "malformed_request",
            ErrorCategory::RenderFailure => "render_failure",
            ErrorCategory::CatalogUnavailable => "catalog_unavailable",
            ErrorCategory::Cancelled => "cancelled",
        }
    }

    /// HTTP-style status for an API layer. 499 is "client closed request".
    pub fn status(self) -> u16 {
        match self {
            ErrorCategory::NotFound => 404,
            ErrorCategory::MalformedRequest => 400,
            ErrorCategory::RenderFailure => 500,
            ErrorCategory::CatalogUnavailable => 503,
            ErrorCategory::Cancelled => 499,
        }
    }
}

/// Everything a datasheet request can surface to its caller.
///
/// Asset fetch and enrichment failures never appear here; they degrade the
/// document instead.
#[derive(Error, Debug)]
pub enum DatasheetError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed request: {0}")]
    MalformedRequest(#[from] ValidationError),

    #[error("Render failed while {stage}: {source}")]
    Render {
        stage: Stage,
        #[source]
        source: RenderError,
    },

    /// The catalog failed on a lookup the request cannot do without.
    #[error("Catalog lookup failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Request cancelled while {0}")]
    Cancelled(Stage),
}

impl DatasheetError {
    pub fn not_found(entity: &str, id: impl fmt::Display) -> Self {
        DatasheetError::NotFound(format!("{} {}", entity, id))
    }

    /// Render errors that are really cancellations keep their own category.
    pub fn from_render(stage: Stage, source: RenderError) -> Self {
        match source {
            RenderError::Cancelled => DatasheetError::Cancelled(stage),
            source => DatasheetError::Render { stage, source },
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DatasheetError::NotFound(_) => ErrorCategory::NotFound,
            DatasheetError::MalformedRequest(_) => ErrorCategory::MalformedRequest,
            DatasheetError::Render { .. } => ErrorCategory::RenderFailure,
            DatasheetError::Catalog(_) => ErrorCategory::CatalogUnavailable,
            DatasheetError::Cancelled(_) => ErrorCategory::Cancelled,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            DatasheetError::NotFound(_)
            | DatasheetError::MalformedRequest(_)
            | DatasheetError::Catalog(_) => Stage::Received,
            DatasheetError::Render { stage, .. } | DatasheetError::Cancelled(stage) => *stage,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::NotFound | ErrorCategory::MalformedRequest
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_categories_and_codes() {
        let not_found = DatasheetError::not_found("product", 42);
        assert_eq!(not_found.to_string(), "Not found: product 42");
        assert_eq!(not_found.category().code(), "not_found");
        assert_eq!(not_found.category().status(), 404);
        assert!(not_found.is_client_error());

        let malformed = DatasheetError::from(ValidationError::MissingField("product_name"));
        assert_eq!(malformed.category(), ErrorCategory::MalformedRequest);
        assert_eq!(malformed.category().status(), 400);
    }

    #[test]
    fn test_render_failure_names_stage_and_cause() {
        let err = DatasheetError::from_render(Stage::Rendering, RenderError::Timeout(Duration::from_secs(30)));
        assert_eq!(err.category(), ErrorCategory::RenderFailure);
        assert_eq!(err.stage(), Stage::Rendering);
        let message = err.to_string();
        assert!(message.contains("rendering"), "{message}");
        assert!(message.contains("30"), "{message}");
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_cancelled_render_is_not_a_failure() {
        let err = DatasheetError::from_render(Stage::Rendering, RenderError::Cancelled);
        assert_eq!(err.category(), ErrorCategory::Cancelled);
        assert_eq!(err.category().status(), 499);
    }
}
