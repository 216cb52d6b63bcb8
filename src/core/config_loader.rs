//! Configuration loader for orb-publisher
//!
//! Merges settings from four sources, lowest to highest priority:
//! built-in defaults, the global config file (`~/.orb-publisher.yaml`),
//! environment variables, and command-line flags. File values may
//! reference environment variables as `${VAR_NAME}`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use secrecy::SecretString;
use serde::Deserialize;
use tokio::fs;

use crate::core::config::CliConfig;
use crate::core::error::ConfigError;

/// Global configuration file name, looked up under the home directory.
const CONFIG_FILENAME: &str = ".orb-publisher.yaml";

/// Environment variable pattern (`${VAR_NAME}`)
const ENV_VAR_PATTERN: &str = r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}";

const ENV_HOST: &str = "ORB_REGISTRY_HOST";
const ENV_ENDPOINT: &str = "ORB_REGISTRY_ENDPOINT";
const ENV_TOKEN: &str = "ORB_REGISTRY_TOKEN";

/// On-disk shape of the config file; every field optional
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    host: Option<String>,
    endpoint: Option<String>,
    token: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// Command-line overrides, the highest-priority source
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub endpoint: Option<String>,
    pub token: Option<String>,
}

/// Inputs to one load: where the file lives and what the environment says
#[derive(Debug, Clone)]
pub struct ConfigLoadOptions {
    /// Explicit config file path; `None` means `~/.orb-publisher.yaml`.
    pub config_path: Option<PathBuf>,
    /// Environment snapshot, injectable for tests.
    pub env: HashMap<String, String>,
    pub overrides: ConfigOverrides,
}

impl ConfigLoadOptions {
    /// Options for a real invocation: process environment, default path.
    pub fn from_process_env(overrides: ConfigOverrides) -> Self {
        Self {
            config_path: None,
            env: std::env::vars().collect(),
            overrides,
        }
    }
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and merge configuration from all sources.
    pub async fn load(options: ConfigLoadOptions) -> Result<CliConfig, ConfigError> {
        let mut config = CliConfig::default();

        let path = match options.config_path.clone() {
            Some(path) => path,
            None => Self::global_config_path(&options.env)?,
        };

        if let Some(file) = Self::load_config_file(&path).await? {
            Self::apply_file(&mut config, file, &options.env)?;
        }

        Self::apply_env(&mut config, &options.env);
        Self::apply_overrides(&mut config, options.overrides);

        Ok(config)
    }

    /// Path of the global config file under the home directory.
    fn global_config_path(env: &HashMap<String, String>) -> Result<PathBuf, ConfigError> {
        let home = env
            .get("HOME")
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::HomeNotFound)?;

        Ok(PathBuf::from(home).join(CONFIG_FILENAME))
    }

    /// Read and parse the YAML config file; absent file is not an error.
    async fn load_config_file(path: &Path) -> Result<Option<ConfigFile>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).await.map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: ConfigFile =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(Some(file))
    }

    /// Overlay file values, expanding `${VAR}` references first.
    fn apply_file(
        config: &mut CliConfig,
        file: ConfigFile,
        env: &HashMap<String, String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = file.host {
            config.host = Self::expand_env_vars(&host, env)?;
        }
        if let Some(endpoint) = file.endpoint {
            config.endpoint = Self::expand_env_vars(&endpoint, env)?;
        }
        if let Some(token) = file.token {
            config.token = Some(SecretString::new(
                Self::expand_env_vars(&token, env)?.into(),
            ));
        }
        if let Some(timeout) = file.request_timeout_secs {
            config.request_timeout_secs = timeout;
        }

        Ok(())
    }

    /// Overlay dedicated environment variables.
    fn apply_env(config: &mut CliConfig, env: &HashMap<String, String>) {
        if let Some(host) = env.get(ENV_HOST) {
            config.host = host.clone();
        }
        if let Some(endpoint) = env.get(ENV_ENDPOINT) {
            config.endpoint = endpoint.clone();
        }
        if let Some(token) = env.get(ENV_TOKEN) {
            config.token = Some(SecretString::new(token.clone().into()));
        }
    }

    /// Overlay command-line flags, the highest-priority source.
    fn apply_overrides(config: &mut CliConfig, overrides: ConfigOverrides) {
        if let Some(host) = overrides.host {
            config.host = host;
        }
        if let Some(endpoint) = overrides.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(token) = overrides.token {
            config.token = Some(SecretString::new(token.into()));
        }
    }

    /// Expand every `${VAR}` reference in `value` from `env`.
    ///
    /// An unset variable fails the whole load rather than silently
    /// substituting an empty string.
    fn expand_env_vars(
        value: &str,
        env: &HashMap<String, String>,
    ) -> Result<String, ConfigError> {
        let pattern = Regex::new(ENV_VAR_PATTERN).expect("pattern is a checked literal");

        let mut result = String::with_capacity(value.len());
        let mut last_end = 0;

        for capture in pattern.captures_iter(value) {
            let whole = capture.get(0).expect("capture 0 always present");
            let name = &capture[1];

            let replacement = env
                .get(name)
                .ok_or_else(|| ConfigError::MissingEnvVar {
                    name: name.to_string(),
                })?;

            result.push_str(&value[last_end..whole.start()]);
            result.push_str(replacement);
            last_end = whole.end();
        }

        result.push_str(&value[last_end..]);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILENAME);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", content).unwrap();
        path
    }

    fn options_with(path: PathBuf, env: HashMap<String, String>) -> ConfigLoadOptions {
        ConfigLoadOptions {
            config_path: Some(path),
            env,
            overrides: ConfigOverrides::default(),
        }
    }

    #[tokio::test]
    async fn test_defaults_when_file_is_absent() {
        let temp_dir = TempDir::new().unwrap();
        let options = options_with(
            temp_dir.path().join(CONFIG_FILENAME),
            HashMap::new(),
        );

        let config = ConfigLoader::load(options).await.unwrap();

        assert_eq!(config.host, crate::core::config::DEFAULT_HOST);
        assert!(config.token.is_none());
    }

    #[tokio::test]
    async fn test_file_values_override_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            "host: https://registry.internal\nendpoint: api/v3\nrequest_timeout_secs: 10\n",
        );

        let config = ConfigLoader::load(options_with(path, HashMap::new()))
            .await
            .unwrap();

        assert_eq!(config.host, "https://registry.internal");
        assert_eq!(config.endpoint, "api/v3");
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[tokio::test]
    async fn test_file_token_expands_env_vars() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, "token: ${MY_ORB_TOKEN}\n");

        let env = HashMap::from([("MY_ORB_TOKEN".to_string(), "tok-123".to_string())]);
        let config = ConfigLoader::load(options_with(path, env)).await.unwrap();

        assert_eq!(config.token.unwrap().expose_secret(), "tok-123");
    }

    #[tokio::test]
    async fn test_missing_env_var_fails_the_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, "token: ${UNSET_ORB_TOKEN}\n");

        let error = ConfigLoader::load(options_with(path, HashMap::new()))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            ConfigError::MissingEnvVar { ref name } if name == "UNSET_ORB_TOKEN"
        ));
    }

    #[tokio::test]
    async fn test_env_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, "host: https://from-file\n");

        let env = HashMap::from([(ENV_HOST.to_string(), "https://from-env".to_string())]);
        let config = ConfigLoader::load(options_with(path, env)).await.unwrap();

        assert_eq!(config.host, "https://from-env");
    }

    #[tokio::test]
    async fn test_cli_overrides_beat_everything() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, "host: https://from-file\n");

        let env = HashMap::from([(ENV_HOST.to_string(), "https://from-env".to_string())]);
        let mut options = options_with(path, env);
        options.overrides.host = Some("https://from-flag".to_string());
        options.overrides.token = Some("flag-token".to_string());

        let config = ConfigLoader::load(options).await.unwrap();

        assert_eq!(config.host, "https://from-flag");
        assert_eq!(config.token.unwrap().expose_secret(), "flag-token");
    }

    #[tokio::test]
    async fn test_malformed_yaml_reports_the_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, "host: [unclosed\n");

        let error = ConfigLoader::load(options_with(path.clone(), HashMap::new()))
            .await
            .unwrap_err();

        assert!(error.to_string().contains(path.to_str().unwrap()));
    }

    #[test]
    fn test_expand_env_vars_handles_mixed_text() {
        let env = HashMap::from([
            ("A".to_string(), "one".to_string()),
            ("B_2".to_string(), "two".to_string()),
        ]);

        let expanded =
            ConfigLoader::expand_env_vars("pre-${A}-mid-${B_2}-post", &env).unwrap();

        assert_eq!(expanded, "pre-one-mid-two-post");
    }

    #[test]
    fn test_expand_env_vars_leaves_plain_text_alone() {
        let expanded =
            ConfigLoader::expand_env_vars("no references here", &HashMap::new()).unwrap();

        assert_eq!(expanded, "no references here");
    }

    #[test]
    fn test_global_path_requires_home() {
        let error = ConfigLoader::global_config_path(&HashMap::new()).unwrap_err();
        assert!(matches!(error, ConfigError::HomeNotFound));
    }
}
