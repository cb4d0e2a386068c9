//! Error type shared by the CMS client, normalizer and renderers

use thiserror::Error;

/// Result alias for blog operations
pub type Result<T> = std::result::Result<T, BlogError>;

#[derive(Error, Debug)]
pub enum BlogError {
    /// The request could not complete (connect, timeout, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The CMS answered with a non-success status
    #[error("CMS responded with {status} for {url}")]
    Status { status: u16, url: String },

    /// The preview resolver rejected the token / document id pair
    #[error("Invalid preview token")]
    InvalidPreviewToken,

    /// No document matches the requested uid
    #[error("No {doc_type} document with uid '{uid}'")]
    NotFound { doc_type: String, uid: String },

    /// A document is missing a field the normalizer requires
    #[error("Malformed document {id}: {reason}")]
    MalformedDocument { id: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BlogError {
    /// Create a malformed-document error.
    pub fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the error means the CMS could not be reached or answered badly.
    pub fn is_network_failure(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }
}
