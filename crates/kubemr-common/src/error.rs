//! Error types shared by the kubemr crates
//!
//! Variants carry enough context (resource kind, startup step) to make a log
//! line actionable without a debugger attached.

use thiserror::Error;

/// Default context value when no specific context is available
pub const UNKNOWN_CONTEXT: &str = "unknown";

/// Main error type for kubemr operations
#[derive(Debug, Error)]
pub enum Error {
    /// Kubernetes API error
    #[error("kubernetes error: {source}")]
    Kube {
        /// The underlying kube-rs error
        #[from]
        source: kube::Error,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being serialized (if known)
        kind: Option<String>,
    },

    /// Startup error (resource type registration, client construction)
    #[error("bootstrap error [{context}]: {message}")]
    Bootstrap {
        /// Description of what failed
        message: String,
        /// Startup step where the error occurred (e.g., "crd", "client")
        context: String,
    },

    /// Internal/operational error
    #[error("internal error [{context}]: {message}")]
    Internal {
        /// Description of what failed
        message: String,
        /// Context where the error occurred (e.g., "create_client", "watcher")
        context: String,
    },
}

impl Error {
    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: None,
        }
    }

    /// Create a serialization error with resource kind context
    pub fn serialization_for_kind(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Create a bootstrap error with the given message
    pub fn bootstrap(msg: impl Into<String>) -> Self {
        Self::Bootstrap {
            message: msg.into(),
            context: UNKNOWN_CONTEXT.to_string(),
        }
    }

    /// Create a bootstrap error with context
    pub fn bootstrap_with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Bootstrap {
            message: msg.into(),
            context: context.into(),
        }
    }

    /// Create an internal error with context
    pub fn internal_with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Internal {
            message: msg.into(),
            context: context.into(),
        }
    }

    /// HTTP status code of the API server response, if this error carries one
    pub fn api_code(&self) -> Option<u16> {
        match self {
            Error::Kube {
                source: kube::Error::Api(ae),
            } => Some(ae.code),
            _ => None,
        }
    }

    /// True when the API server answered 404 Not Found
    pub fn is_not_found(&self) -> bool {
        self.api_code() == Some(404)
    }

    /// True when the API server answered 409 AlreadyExists/Conflict
    pub fn is_conflict(&self) -> bool {
        self.api_code() == Some(409)
    }

    /// Check if this error is retryable
    ///
    /// Kubernetes 4xx answers and serialization errors need a fix elsewhere;
    /// connection failures, timeouts and 5xx answers may clear on their own.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Kube { source } => !matches!(
                source,
                kube::Error::Api(ae) if (400..500).contains(&ae.code)
            ),
            Error::Serialization { .. } => false,
            Error::Bootstrap { .. } => true,
            Error::Internal { .. } => true,
        }
    }

    /// Get the context if this error has one
    pub fn context(&self) -> Option<&str> {
        match self {
            Error::Bootstrap { context, .. } => Some(context),
            Error::Internal { context, .. } => Some(context),
            _ => None,
        }
    }
}
