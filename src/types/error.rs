//! Error types for document assembly
//!
//! One error enum crosses every component boundary unchanged. The single
//! locally-recovered case is a compound-resolution linkage failure under
//! the IGNORE strategy, which is logged and dropped by the resolver.

/// Boxed error for causes raised by pluggable collaborators (data
/// suppliers, custom extractors). The chain is preserved via `source()`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for assembly operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Pagination token that failed to decode; carries the offending token
    #[error("Invalid pagination cursor: {0}")]
    InvalidCursor(String),

    /// Principal's tier weight is below the required tier's weight
    #[error("Access tier {actual} does not meet required tier {required}")]
    InsufficientAccessTier { required: String, actual: String },

    /// Principal's scope set failed the required scope expression
    #[error("Missing required scopes: {0}")]
    InsufficientScopes(String),

    /// Ownership check failed and no override tier applied
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Supplier reported the record absent
    #[error("Resource not found: {resource_type}/{id}")]
    ResourceNotFound { resource_type: String, id: String },

    /// Supplier raised; the cause is preserved, never downgraded
    #[error("Data retrieval failed: {0}")]
    DataRetrieval(#[source] BoxError),

    /// A resource definition failed to convert a record into document
    /// members - a programming defect, not a runtime condition
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// A linkage failed while the FAIL error strategy was active
    #[error("Compound resolution failed for {resource_type}/{id}: {cause}")]
    CompoundResolution {
        resource_type: String,
        id: String,
        #[source]
        cause: BoxError,
    },

    /// Registration or configuration defect detected at startup/validation
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status code class for this error, for the transport adapter
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidCursor(_) => 400,
            Self::InsufficientAccessTier { .. } => 403,
            Self::InsufficientScopes(_) => 403,
            Self::Forbidden(_) => 403,
            Self::ResourceNotFound { .. } => 404,
            Self::DataRetrieval(_) => 502,
            Self::Mapping(_) => 500,
            Self::CompoundResolution { .. } => 502,
            Self::Config(_) => 500,
        }
    }

    /// Stable machine-readable error code for JSON:API error objects
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCursor(_) => "invalid_cursor",
            Self::InsufficientAccessTier { .. } => "insufficient_access_tier",
            Self::InsufficientScopes(_) => "insufficient_scopes",
            Self::Forbidden(_) => "forbidden",
            Self::ResourceNotFound { .. } => "resource_not_found",
            Self::DataRetrieval(_) => "data_retrieval_failed",
            Self::Mapping(_) => "mapping_error",
            Self::CompoundResolution { .. } => "compound_resolution_failed",
            Self::Config(_) => "configuration_error",
        }
    }

    /// Request parameter this error points at, if any
    pub fn source_parameter(&self) -> Option<&'static str> {
        match self {
            Self::InvalidCursor(_) => Some("page[cursor]"),
            _ => None,
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::InvalidCursor("x".into()).status_code(), 400);
        assert_eq!(
            Error::InsufficientAccessTier {
                required: "ADMIN".into(),
                actual: "PUBLIC".into()
            }
            .status_code(),
            403
        );
        assert_eq!(
            Error::ResourceNotFound {
                resource_type: "article".into(),
                id: "1".into()
            }
            .status_code(),
            404
        );
        assert_eq!(Error::Mapping("bad".into()).status_code(), 500);
    }

    #[test]
    fn test_cause_preserved() {
        let cause: BoxError = "backend unreachable".into();
        let err = Error::DataRetrieval(cause);
        let source = std::error::Error::source(&err).expect("source retained");
        assert_eq!(source.to_string(), "backend unreachable");
    }

    #[test]
    fn test_cursor_error_names_parameter() {
        let err = Error::InvalidCursor("!!!".into());
        assert_eq!(err.source_parameter(), Some("page[cursor]"));
        assert_eq!(Error::Forbidden("nope".into()).source_parameter(), None);
    }
}
