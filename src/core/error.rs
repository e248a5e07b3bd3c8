//! Error types for cxrefs
//!
//! Only `NotFound` and `StalePath` are meant to reach a caller of the core.
//! `UpstreamUnavailable` is produced by index adapters and absorbed by every
//! core component, which carries on with an empty collection instead.

use thiserror::Error;

/// Result type alias using cxrefs' Error
pub type Result<T> = std::result::Result<T, Error>;

/// cxrefs error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not find signature for: {text}")]
    NotFound { text: String },

    #[error("Stale tree path: {path}")]
    StalePath { path: String },

    #[error("Index unavailable: {message}")]
    UpstreamUnavailable { message: String },

    #[error("Unknown edge kind: {kind}")]
    UnknownEdgeKind { kind: String },

    #[error("Unknown annotation kind: {kind}")]
    UnknownAnnotationKind { kind: String },

    #[error("Invalid tree path: {input}")]
    InvalidPath { input: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Shorthand for an index query that failed or timed out
    pub fn upstream(message: impl Into<String>) -> Self {
        Error::UpstreamUnavailable {
            message: message.into(),
        }
    }

    /// True for failures that the core absorbs as "no data"
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::UpstreamUnavailable { .. } | Error::Http(_) | Error::Json(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_the_text() {
        let err = Error::NotFound {
            text: "DoLoop".to_string(),
        };
        assert_eq!(err.to_string(), "Could not find signature for: DoLoop");
    }

    #[test]
    fn test_upstream_classification() {
        assert!(Error::upstream("timed out").is_upstream());
        assert!(!Error::StalePath {
            path: "0,1".to_string()
        }
        .is_upstream());
    }
}
