//! Client configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use wp_store::Endpoint;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// URL of the plotting endpoint script.
    pub endpoint: String,
    /// Directory of the local cache (session id, last settings).
    pub cache_dir: PathBuf,
    /// Request timeout in seconds; absent means wait indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_s: Option<f64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/webplot.py".to_string(),
            cache_dir: PathBuf::from(".webplot"),
            timeout_s: None,
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_s
            .filter(|s| *s > 0.0)
            .and_then(|s| Duration::try_from_secs_f64(s).ok())
    }

    pub fn endpoint(&self) -> AppResult<Endpoint> {
        Ok(Endpoint::new(&self.endpoint, self.timeout())?)
    }
}

/// Load a YAML config file; missing keys take their defaults.
pub fn load_config(path: &Path) -> AppResult<ClientConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_yaml::from_str(&content).map_err(|e| AppError::ConfigParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: ClientConfig =
            serde_yaml::from_str("endpoint: https://plots.example.org/webplot.py\n").unwrap();
        assert_eq!(config.endpoint, "https://plots.example.org/webplot.py");
        assert_eq!(config.cache_dir, PathBuf::from(".webplot"));
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn timeout_ignores_nonsense() {
        let mut config = ClientConfig {
            timeout_s: Some(2.5),
            ..ClientConfig::default()
        };
        assert_eq!(config.timeout(), Some(Duration::from_millis(2500)));
        config.timeout_s = Some(-1.0);
        assert_eq!(config.timeout(), None);
        config.timeout_s = Some(f64::NAN);
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn huge_timeout_from_yaml_is_ignored() {
        let config: ClientConfig = serde_yaml::from_str("timeout_s: 1.0e300
").unwrap();
        assert_eq!(config.timeout(), None);
    }
}
