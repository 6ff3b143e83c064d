// ── Runtime configuration ──
//
// These types describe *how* the data layer runs: where the remote is
// (if any), where the mirror lives, and the background cadences. The
// CLI constructs a `RuntimeConfig` and hands it in -- core never reads
// config files.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::session::REFRESH_INTERVAL;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict). Default.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs on lab deployments).
    DangerAcceptInvalid,
}

/// Connection parameters for the remote API.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Server root URL (e.g., `https://inventory.example.com`).
    pub url: Url,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Transport-level retry budget for 429s and network failures.
    pub retries: u32,
}

impl RemoteConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            retries: 3,
        }
    }
}

/// Configuration for the whole data layer.
///
/// `remote: None` means offline-only: hybrid reads resolve from the
/// mirror, writes land locally, and the connectivity monitor never runs.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub remote: Option<RemoteConfig>,
    /// Directory holding the mirror files.
    pub data_dir: PathBuf,
    /// Silent token-refresh cadence while authenticated.
    pub refresh_interval: Duration,
    /// Connectivity probe cadence.
    pub probe_interval: Duration,
    /// Read auto-refresh cadence. `None` disables polling.
    pub polling_interval: Option<Duration>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            remote: None,
            data_dir: PathBuf::from(".inventra"),
            refresh_interval: REFRESH_INTERVAL,
            probe_interval: Duration::from_secs(30),
            polling_interval: Some(Duration::from_secs(60)),
        }
    }
}
