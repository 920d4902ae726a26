//! Result and error types for Scrollseek.

use thiserror::Error;

use crate::finder::FinderRef;

/// Result type for Scrollseek operations
pub type SeekResult<T> = Result<T, SeekError>;

/// Errors that can occur while locating elements
#[derive(Debug, Error)]
pub enum SeekError {
    /// A matcher was built with missing or malformed arguments
    #[error("Invalid matcher: {message}")]
    InvalidMatcher {
        /// Error message
        message: String,
    },

    /// A poll did not satisfy its condition within its budget
    #[error("Timed out after {timeout_ms}ms polling for {finder}")]
    Timeout {
        /// The finder that was being polled for
        finder: FinderRef,
        /// Budget that elapsed
        timeout_ms: u64,
    },

    /// The finder did not resolve to any element
    #[error("Element not found: {finder}")]
    ElementNotFound {
        /// The finder that could not be resolved
        finder: FinderRef,
    },

    /// The scrollable container itself could not be resolved
    #[error("Scroll container not found: {finder}")]
    ContainerNotFound {
        /// The container finder
        finder: FinderRef,
    },

    /// The UI-tree provider failed to produce a snapshot
    #[error("Tree provider failed: {message}")]
    Provider {
        /// Error message
        message: String,
    },

    /// The scroll executor could not perform the gesture
    #[error("Scroll failed: {message}")]
    ScrollFailed {
        /// Error message
        message: String,
    },

    /// Configuration is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl SeekError {
    /// Create an invalid matcher error
    #[must_use]
    pub fn invalid_matcher(message: impl Into<String>) -> Self {
        Self::InvalidMatcher {
            message: message.into(),
        }
    }

    /// Create a tree provider error
    #[must_use]
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Create a scroll failure
    #[must_use]
    pub fn scroll_failed(message: impl Into<String>) -> Self {
        Self::ScrollFailed {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a not-found error for `finder`
    #[must_use]
    pub fn not_found(finder: FinderRef) -> Self {
        Self::ElementNotFound { finder }
    }

    /// True for [`SeekError::ElementNotFound`]
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. })
    }

    /// True for [`SeekError::Timeout`]
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// The finder this error is about, if any
    #[must_use]
    pub fn finder(&self) -> Option<&FinderRef> {
        match self {
            Self::Timeout { finder, .. }
            | Self::ElementNotFound { finder }
            | Self::ContainerNotFound { finder } => Some(finder),
            _ => None,
        }
    }
}
