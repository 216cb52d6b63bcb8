//! Configuration structures for orb-publisher
//!
//! `CliConfig` carries the registry connection settings for one process.
//! `OutputOptions` carries the per-invocation rendering switches; they are
//! plain values handed to the components that need them, never process-wide
//! state.

use secrecy::SecretString;

/// Default registry host.
pub const DEFAULT_HOST: &str = "https://hub.orbs.dev";

/// Default API endpoint path under the host.
pub const DEFAULT_ENDPOINT: &str = "api/v2";

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Registry connection settings
///
/// The token is a `SecretString`: it never appears in `Debug` output and
/// is only exposed at the moment the authorization header is built.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub host: String,
    pub endpoint: String,
    pub token: Option<SecretString>,
    pub request_timeout_secs: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl CliConfig {
    /// Base URL for API requests: `<host>/<endpoint>`, without a trailing slash.
    pub fn api_base(&self) -> String {
        format!(
            "{}/{}",
            self.host.trim_end_matches('/'),
            self.endpoint.trim_matches('/')
        )
    }
}

/// Per-invocation output switches for listing commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputOptions {
    /// Serialize the listing snapshot as JSON instead of text.
    pub json: bool,
    /// Render commands/jobs/executors and their parameters.
    pub details: bool,
    /// Include uncertified orbs in the listing.
    pub uncertified: bool,
}
