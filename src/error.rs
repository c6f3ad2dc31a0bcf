//! Error types for bridge operations.
//!
//! This module provides structured error handling for the bridge, including
//! categorization, severity levels, and the HTTP status each failure maps to.
//!
//! # Propagation
//!
//! Status and model-discovery calls never return a [`BridgeError`] to their
//! callers: adapters fold every failure into an offline
//! [`ProviderStatus`](crate::ProviderStatus) or an empty model list. Only the
//! chat path raises, and the endpoint layer maps the raised error with
//! [`BridgeError::http_status`].
//!
//! # Example
//!
//! ```rust
//! use luxrig_bridge::{BridgeError, error::ErrorCategory};
//!
//! let err = BridgeError::unknown_provider("mystery");
//! assert_eq!(err.category(), ErrorCategory::Client);
//! assert_eq!(err.http_status(), 400);
//! ```

use crate::logging::{log_error, log_warn};
use thiserror::Error;

// ============================================================================
// Error categorization types
// ============================================================================

/// High-level categorization of errors for routing and handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The caller sent something we cannot act on (bad provider, bad body).
    Client,

    /// The upstream provider answered, but with an error or garbage.
    External,

    /// The upstream provider could not be reached in time.
    ///
    /// Nothing is retried by the bridge; the client may try again.
    Transient,
}

/// Severity level for logging and alerting decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Action failed but the bridge is stable.
    Error,

    /// Unexpected but recoverable (offline provider, malformed output).
    Warning,

    /// Expected failure such as a validation error.
    Info,
}

// ============================================================================
// Bridge error type
// ============================================================================

/// Convenient result type for bridge operations.
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur while serving bridge requests.
///
/// Use the constructor methods, which log the error at the matching level.
///
/// | Variant | Category | HTTP |
/// |---------|----------|------|
/// | `UnknownProvider` | Client | 400 |
/// | `InvalidRequest` | Client | 400 |
/// | `Upstream` | External | 502 |
/// | `Unavailable` | Transient | 502 |
/// | `ResponseParsing` | External | 502 |
/// | `Configuration` | Client | 500 |
#[derive(Error, Debug)]
pub enum BridgeError {
    /// No adapter is registered under the requested provider id.
    #[error("Unknown provider: {provider}")]
    UnknownProvider {
        /// The provider id the client asked for.
        provider: String,
    },

    /// The request failed validation before reaching any adapter.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// What was wrong with the request.
        message: String,
    },

    /// The upstream was reachable but answered with a non-2xx status.
    #[error("{provider} returned HTTP {status}: {body}")]
    Upstream {
        /// Display name of the provider that failed.
        provider: String,
        /// Upstream HTTP status code.
        status: u16,
        /// Upstream response body, verbatim.
        body: String,
    },

    /// The upstream could not be reached (connection refused, DNS, timeout).
    #[error("{message}")]
    Unavailable {
        /// Display name of the provider that failed.
        provider: String,
        /// Description of the failure, mentioning the provider.
        message: String,
        /// The underlying transport error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The upstream answered 2xx but the body could not be decoded.
    #[error("Malformed response from {provider}: {message}")]
    ResponseParsing {
        /// Display name of the provider that failed.
        provider: String,
        /// Details about the parsing failure.
        message: String,
    },

    /// Bridge configuration is invalid or incomplete.
    #[error("Bridge configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl BridgeError {
    /// Get the error category for routing and handling decisions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownProvider { .. } => ErrorCategory::Client,
            Self::InvalidRequest { .. } => ErrorCategory::Client,
            Self::Upstream { .. } => ErrorCategory::External,
            Self::Unavailable { .. } => ErrorCategory::Transient,
            Self::ResponseParsing { .. } => ErrorCategory::External,
            Self::Configuration { .. } => ErrorCategory::Client,
        }
    }

    /// Get the error severity for logging and alerting.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownProvider { .. } => ErrorSeverity::Info,
            Self::InvalidRequest { .. } => ErrorSeverity::Info,
            Self::Upstream { .. } => ErrorSeverity::Error,
            Self::Unavailable { .. } => ErrorSeverity::Warning,
            Self::ResponseParsing { .. } => ErrorSeverity::Warning,
            Self::Configuration { .. } => ErrorSeverity::Error,
        }
    }

    /// HTTP status code the endpoint layer answers with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::UnknownProvider { .. } | Self::InvalidRequest { .. } => 400,
            Self::Upstream { .. } | Self::Unavailable { .. } | Self::ResponseParsing { .. } => 502,
            Self::Configuration { .. } => 500,
        }
    }

    /// Display name of the provider involved, when the error came from one.
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::Upstream { provider, .. }
            | Self::Unavailable { provider, .. }
            | Self::ResponseParsing { provider, .. } => Some(provider),
            _ => None,
        }
    }

    /// Convert to a user-friendly message suitable for display.
    ///
    /// Provider names are kept so a dashboard can say which backend is down.
    pub fn user_message(&self) -> String {
        match self {
            Self::UnknownProvider { provider } => {
                format!("No AI provider named '{provider}' is configured")
            }
            Self::InvalidRequest { message } => format!("Invalid request: {message}"),
            Self::Upstream { provider, status, .. } => {
                format!("{provider} rejected the request (HTTP {status})")
            }
            Self::Unavailable { provider, .. } => {
                format!("{provider} is not reachable. Is it running?")
            }
            Self::ResponseParsing { provider, .. } => {
                format!("Received an invalid response from {provider}")
            }
            Self::Configuration { .. } => {
                "Bridge configuration issue. Please check your settings".to_string()
            }
        }
    }

    // =========================================================================
    // Constructor methods with automatic logging
    // =========================================================================

    /// Create an unknown provider error (logs at WARN level).
    pub fn unknown_provider(provider: impl Into<String>) -> Self {
        let provider = provider.into();
        log_warn!(
            provider = %provider,
            error_type = "unknown_provider",
            "Chat requested for unregistered provider"
        );
        Self::UnknownProvider { provider }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        let message = message.into();
        log_warn!(
            error_type = "invalid_request",
            message = %message,
            "Rejected invalid bridge request"
        );
        Self::InvalidRequest { message }
    }

    pub fn upstream(provider: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        let provider = provider.into();
        let body = body.into();
        log_error!(
            error_type = "upstream",
            provider = %provider,
            status = status,
            body = %body,
            "Upstream provider returned an error status"
        );
        Self::Upstream {
            provider,
            status,
            body,
        }
    }

    pub fn unavailable(
        provider: impl Into<String>,
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        let provider = provider.into();
        let message = message.into();
        log_warn!(
            error_type = "unavailable",
            provider = %provider,
            message = %message,
            has_source = source.is_some(),
            "Upstream provider unreachable"
        );
        Self::Unavailable {
            provider,
            message,
            source,
        }
    }

    pub fn response_parsing(provider: impl Into<String>, message: impl Into<String>) -> Self {
        let provider = provider.into();
        let message = message.into();
        log_warn!(
            error_type = "response_parsing",
            provider = %provider,
            message = %message,
            "Upstream response format invalid"
        );
        Self::ResponseParsing { provider, message }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "configuration",
            message = %message,
            "Bridge configuration validation failed"
        );
        Self::Configuration { message }
    }
}
