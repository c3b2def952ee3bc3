//! TOML configuration for the `dq` binary and server.
//!
//! ```toml
//! [content]
//! path = "./content.json"
//!
//! [index]
//! strict_fields = true
//!
//! [delivery]
//! default_culture = "en-us"
//! default_page_size = 10
//! max_page_size = 100
//! filter_values = "any"
//!
//! [server]
//! bind = "127.0.0.1:8080"
//! ```

use anyhow::{Context, Result};
use delivery_query_core::index::memory::MultiValueMode;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub content: ContentConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    /// JSON file holding an array of content items.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    /// Fail startup when two index handlers define the same field.
    #[serde(default = "default_strict_fields")]
    pub strict_fields: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            strict_fields: default_strict_fields(),
        }
    }
}

fn default_strict_fields() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeliveryConfig {
    /// Culture used when a request names none.
    #[serde(default)]
    pub default_culture: Option<String>,
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
    #[serde(default)]
    pub filter_values: MultiValueMode,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            default_culture: None,
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            filter_values: MultiValueMode::default(),
        }
    }
}

fn default_page_size() -> usize {
    10
}
fn default_max_page_size() -> usize {
    100
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl Config {
    /// Clamp a requested page size to `[0, max_page_size]`, defaulting when absent.
    pub fn page_size(&self, take: Option<usize>) -> usize {
        take.unwrap_or(self.delivery.default_page_size)
            .min(self.delivery.max_page_size)
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Relative content paths resolve against the config file's directory.
    if config.content.path.is_relative() {
        if let Some(dir) = path.parent() {
            config.content.path = dir.join(&config.content.path);
        }
    }

    if config.delivery.max_page_size == 0 {
        anyhow::bail!("delivery.max_page_size must be > 0");
    }

    if config.delivery.default_page_size == 0 {
        anyhow::bail!("delivery.default_page_size must be > 0");
    }

    if config.delivery.default_page_size > config.delivery.max_page_size {
        anyhow::bail!(
            "delivery.default_page_size ({}) must not exceed delivery.max_page_size ({})",
            config.delivery.default_page_size,
            config.delivery.max_page_size
        );
    }

    if let Some(culture) = &config.delivery.default_culture {
        if culture.trim().is_empty() {
            anyhow::bail!("delivery.default_culture must not be empty when set");
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let file = write_config("[content]\npath = \"content.json\"\n");
        let config = load_config(file.path()).unwrap();

        assert!(config.index.strict_fields);
        assert_eq!(config.delivery.default_page_size, 10);
        assert_eq!(config.delivery.max_page_size, 100);
        assert_eq!(config.delivery.filter_values, MultiValueMode::Any);
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(
            config.content.path,
            file.path().parent().unwrap().join("content.json")
        );
    }

    #[test]
    fn test_full_config() {
        let file = write_config(
            r#"
[content]
path = "/srv/content.json"

[index]
strict_fields = false

[delivery]
default_culture = "en-us"
default_page_size = 5
max_page_size = 20
filter_values = "all"

[server]
bind = "0.0.0.0:9000"
"#,
        );
        let config = load_config(file.path()).unwrap();

        assert!(!config.index.strict_fields);
        assert_eq!(config.delivery.default_culture.as_deref(), Some("en-us"));
        assert_eq!(config.delivery.filter_values, MultiValueMode::All);
        assert_eq!(config.content.path, PathBuf::from("/srv/content.json"));
        assert_eq!(config.server.bind, "0.0.0.0:9000");
    }

    #[test]
    fn test_page_size_clamped() {
        let file = write_config("[content]\npath = \"c.json\"\n[delivery]\nmax_page_size = 20\n");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.page_size(None), 10);
        assert_eq!(config.page_size(Some(3)), 3);
        assert_eq!(config.page_size(Some(500)), 20);
        assert_eq!(config.page_size(Some(0)), 0);
    }

    #[test]
    fn test_default_page_size_above_max_rejected() {
        let file = write_config(
            "[content]\npath = \"c.json\"\n[delivery]\ndefault_page_size = 50\nmax_page_size = 20\n",
        );
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_unknown_filter_mode_rejected() {
        let file = write_config("[content]\npath = \"c.json\"\n[delivery]\nfilter_values = \"some\"\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_missing_content_section_rejected() {
        let file = write_config("[server]\nbind = \"127.0.0.1:1\"\n");
        assert!(load_config(file.path()).is_err());
    }
}
