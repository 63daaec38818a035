//! Error and diagnostic types for document loading and schema resolution

use thiserror::Error;
use tracing::Level;

/// Result type alias for loader operations
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Errors raised while loading an OpenAPI document
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to fetch OpenAPI document: {0}")]
    FetchError(String),

    #[error("Invalid OpenAPI document format: {0}")]
    InvalidFormat(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),
}

/// Non-fatal conditions reported while resolving schemas.
///
/// The resolver never fails; each of these is absorbed into a fallback value
/// and recorded so callers can tell a partial resolution from a complete one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveDiagnostic {
    /// The reference names a schema that is not in the registry
    #[error("unresolved model {name} (from {reference})")]
    UnresolvedReference { name: String, reference: String },

    /// The reference is already being resolved further up the stack
    #[error("avoiding infinite loop while resolving {name}")]
    CycleAvoided { name: String },

    /// The schema is not a reference, array, object or composition
    #[error("no type match for {schema}")]
    NoTypeMatch { schema: String },
}

impl ResolveDiagnostic {
    /// Log level this condition is reported at
    pub fn level(&self) -> Level {
        match self {
            ResolveDiagnostic::CycleAvoided { .. } => Level::DEBUG,
            _ => Level::ERROR,
        }
    }

    /// Whether this condition leaves a reference in the output tree
    pub fn is_unresolved(&self) -> bool {
        matches!(self, ResolveDiagnostic::UnresolvedReference { .. })
    }
}
