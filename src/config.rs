use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default embedding model (multilingual, 1024 dimensions)
const DEFAULT_MODEL: &str = "multilingual-e5-large";
/// Default model cache directory
const DEFAULT_CACHE_DIR: &str = ".cache/roomrec";
/// Default model download timeout in seconds
const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;
/// Default number of results returned when the caller doesn't ask for more
const DEFAULT_LIMIT: usize = 5;

/// Engine configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Model name for embeddings (e.g., "multilingual-e5-large")
    #[serde(default = "default_model")]
    pub model: String,

    /// Directory to cache downloaded models
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,

    /// Timeout for model download in seconds
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,

    /// Number of results to return when no limit is given
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            cache_dir: DEFAULT_CACHE_DIR.to_string(),
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            default_limit: DEFAULT_LIMIT,
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_cache_dir() -> String {
    DEFAULT_CACHE_DIR.to_string()
}

fn default_download_timeout_secs() -> u64 {
    DEFAULT_DOWNLOAD_TIMEOUT_SECS
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Config {
    fn validate(&self) {
        if self.model.trim().is_empty() {
            panic!("model must not be empty");
        }

        if self.download_timeout_secs == 0 {
            panic!("download_timeout_secs must be greater than 0");
        }

        if self.default_limit == 0 {
            panic!("default_limit must be at least 1");
        }
    }

    /// Load configuration from a YAML file, creating it with defaults if it
    /// does not exist yet.
    pub fn load_with(path: &Path) -> Self {
        // create new if does not exist
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("failed to create config directory");
            }
            std::fs::write(path, serde_yml::to_string(&Self::default()).unwrap())
                .expect("failed to write default config");
        }

        let config_str =
            std::fs::read_to_string(path).expect("config file is not valid utf8");
        let config: Self = serde_yml::from_str(&config_str).expect("config is malformed");

        config.validate();

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.model, "multilingual-e5-large");
        assert_eq!(config.download_timeout_secs, 300);
        assert_eq!(config.default_limit, 5);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: Config = serde_yml::from_str("model: multilingual-e5-small\n").unwrap();
        assert_eq!(config.model, "multilingual-e5-small");
        assert_eq!(config.default_limit, 5);
        assert_eq!(config.cache_dir, ".cache/roomrec");
    }

    #[test]
    #[should_panic(expected = "default_limit")]
    fn test_zero_limit_panics() {
        let config: Config = serde_yml::from_str("default_limit: 0\n").unwrap();
        config.validate();
    }

    #[test]
    fn test_load_with_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let config = Config::load_with(&path);
        assert!(path.exists());
        assert_eq!(config.model, "multilingual-e5-large");

        // Second load reads the file it just wrote
        let again = Config::load_with(&path);
        assert_eq!(again.model, config.model);
    }
}
