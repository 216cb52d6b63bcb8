//! Error handling for orb registry operations
//!
//! Three enums cover the three failure domains:
//! - `OrbError` — command-level failures (local validation and wrapped remote errors)
//! - `RegistryError` — failures returned by the remote registry collaborator
//! - `ConfigError` — configuration loading failures

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for orb commands
#[derive(Debug, Error)]
pub enum OrbError {
    /// The orb reference string did not match the expected shape.
    ///
    /// Local failure: raised before any network call, never retried.
    #[error("invalid orb reference `{reference}`: expected {expected}")]
    InvalidReferenceFormat {
        reference: String,
        expected: &'static str,
    },

    /// The version-bump segment was not one of the three accepted labels.
    #[error("expected `{segment}` to be one of \"major\", \"minor\", or \"patch\"")]
    InvalidSegment { segment: String },

    /// Promote was asked to operate on a released version.
    ///
    /// Raised locally so the guaranteed-to-fail round trip is never issued.
    #[error("version `{version}` must be a dev version (the string should begin with `dev:`)")]
    PromotionRequiresDevVersion { version: String },

    /// A remote call failed; `context` names the operation and the
    /// reference or namespace involved.
    #[error("{context}")]
    Registry {
        context: String,
        #[source]
        source: RegistryError,
    },
}

impl OrbError {
    /// Wrap a registry failure with an operation-specific context message.
    pub fn registry(context: impl Into<String>, source: RegistryError) -> Self {
        Self::Registry {
            context: context.into(),
            source,
        }
    }

    /// Check whether this error was produced without contacting the registry.
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::Registry { .. })
    }
}

/// Errors returned by the registry collaborator
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The namespace/name pair does not resolve to a registered orb.
    #[error("orb `{namespace}/{name}` not found in the registry")]
    NotFound { namespace: String, name: String },

    /// The registry rejected the request (conflict, permissions, bad input).
    #[error("registry rejected the request: {message}")]
    Api { message: String },

    /// Schema or content problems reported by validate/process.
    ///
    /// Rendered exactly as returned by the registry, one message per line.
    #[error("{}", messages.join("\n"))]
    Validation { messages: Vec<String> },

    /// Transport-level failure (connection, TLS, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The registry answered with a body this client could not interpret.
    #[error("unexpected response from the registry: {message}")]
    Decode { message: String },

    /// Reading orb source from disk or stdin failed.
    #[error("failed to read orb source at `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file at `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file at `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A `${VAR}` reference in a config value named an unset variable.
    #[error("config references environment variable `{name}`, which is not set")]
    MissingEnvVar { name: String },

    /// `$HOME` is unset or unusable, so the global config path cannot be built.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}
