// ── Core error types ──
//
// User-facing errors from inventra-core. Consumers never see raw reqwest
// failures or JSON parse errors directly -- the `From<inventra_api::Error>`
// impl translates transport-layer errors into domain-appropriate variants.
// Role-check and state-guard failures originate here, before any I/O.

use thiserror::Error;

use crate::authz::Action;
use crate::model::{AssetStatus, Role};

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    // ── Authorization / state guards ─────────────────────────────────
    #[error("Permission denied: role '{role}' may not {action}")]
    PermissionDenied { role: Role, action: Action },

    #[error("Invalid state transition: cannot {action} an asset that is {status}")]
    InvalidStateTransition {
        action: &'static str,
        status: AssetStatus,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No remote configured -- operation requires a server connection")]
    NotConfigured,

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Local store error: {message}")]
    Mirror { message: String },

    // ── Remote errors (translated, not exposed raw) ──────────────────
    #[error("Cannot reach server: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Server timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Server rejected the request: insufficient permissions")]
    Forbidden,

    #[error("Rate limited by the server")]
    RateLimited,

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<inventra_api::Error> for CoreError {
    fn from(err: inventra_api::Error) -> Self {
        match err {
            inventra_api::Error::Network(reason) => CoreError::ConnectionFailed { reason },
            inventra_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            inventra_api::Error::Tls(reason) => CoreError::ConnectionFailed {
                reason: format!("TLS error: {reason}"),
            },
            inventra_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            inventra_api::Error::Unauthorized => CoreError::Auth {
                message: "session expired or invalid credentials".into(),
            },
            inventra_api::Error::Forbidden => CoreError::Forbidden,
            inventra_api::Error::RateLimited { .. } => CoreError::RateLimited,
            inventra_api::Error::Http { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            inventra_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

impl CoreError {
    /// Returns `true` if this failure came from the remote being
    /// unreachable or overloaded (candidates for local fallback).
    pub fn is_remote_unavailable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::Timeout { .. } | Self::RateLimited
        )
    }
}
