use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Root directory the store keeps its contexts under.
    pub root: PathBuf,
}

/// Defaults applied to `retrieve` when the caller does not bound the call
/// explicitly.
#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_max_total_bytes")]
    pub max_total_bytes: u64,
    #[serde(default = "default_window")]
    pub window: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            max_total_bytes: default_max_total_bytes(),
            window: default_window(),
        }
    }
}

fn default_max_results() -> usize {
    1024
}
fn default_max_total_bytes() -> u64 {
    256 * 1024 * 1024
}
fn default_window() -> usize {
    32
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_gets_retrieval_defaults() {
        let config: Config = toml::from_str(
            r#"
            [store]
            root = "/var/lib/cvault"
            "#,
        )
        .unwrap();
        assert_eq!(config.store.root, PathBuf::from("/var/lib/cvault"));
        assert_eq!(config.retrieval.max_results, 1024);
        assert_eq!(config.retrieval.max_total_bytes, 256 * 1024 * 1024);
        assert_eq!(config.retrieval.window, 32);
    }

    #[test]
    fn test_retrieval_overrides_parse() {
        let config: Config = toml::from_str(
            r#"
            [store]
            root = "./store"

            [retrieval]
            max_results = 16
            max_total_bytes = 1048576
            window = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.retrieval.max_results, 16);
        assert_eq!(config.retrieval.max_total_bytes, 1 << 20);
        assert_eq!(config.retrieval.window, 4);
    }
}
