use thiserror::Error;

/// Top-level error type for the `inventra-api` crate.
///
/// Covers every failure mode at the transport boundary: connectivity,
/// timeouts, auth rejection, rate limiting, and malformed payloads.
/// `inventra-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// Connection-level failure (connection refused, DNS failure, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded the configured timeout.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── HTTP status classification ──────────────────────────────────
    /// HTTP 401. The client clears its bearer token as a side effect;
    /// the caller must re-authenticate.
    #[error("Unauthorized -- authentication required")]
    Unauthorized,

    /// HTTP 403. No session mutation occurs.
    #[error("Forbidden -- insufficient permissions")]
    Forbidden,

    /// HTTP 429 and the retry budget is exhausted.
    #[error("Rate limited -- gave up after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// Any other non-2xx status, with the message parsed from the
    /// response envelope when the body allows it.
    #[error("API error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error means the bearer token is no longer
    /// accepted and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }

    /// Map a `reqwest` send error into the taxonomy.
    ///
    /// reqwest reports its own timeout; everything else at the send stage
    /// is a connectivity problem.
    pub(crate) fn from_send(err: &reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout_secs }
        } else {
            Self::Network(err.to_string())
        }
    }
}
