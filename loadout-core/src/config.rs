use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::keys::DEFAULT_NAMESPACE;

/// Default sidebar ordering for the catalog's menus.
fn default_menu_order() -> Vec<String> {
    [
        "all",
        "kuva",
        "tenet",
        "coda",
        "primary",
        "secondary",
        "melee",
        "archgun",
        "archmelee",
        "sentinelweapon",
        "mods",
        "arcanes",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Variant menus excluded from the search-all union by default.
fn default_exclude() -> Vec<String> {
    ["kuva", "tenet", "coda"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn default_title() -> String {
    "Item Tracker".to_string()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_catalog() -> PathBuf {
    PathBuf::from("items.json")
}

fn default_storage() -> PathBuf {
    PathBuf::from("loadout_store.json")
}

fn default_debounce_ms() -> u64 {
    250
}

/// Root configuration file structure
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LoadoutConfig {
    /// Title shown on the search-all view
    #[serde(default = "default_title")]
    pub title: String,

    /// Persistence key namespace (kept `wf` for data compatibility)
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Path to the catalog document
    #[serde(default = "default_catalog")]
    pub catalog: PathBuf,

    /// Path to the key-value store file
    #[serde(default = "default_storage")]
    pub storage: PathBuf,

    /// Sidebar ordering of catalog menus; unnamed menus go last
    #[serde(default = "default_menu_order")]
    pub menu_order: Vec<String>,

    /// Menu ids excluded from the search-all union
    #[serde(default = "default_exclude")]
    pub exclude_from_search: Vec<String>,

    /// Search-input quiescence window before rows recompute
    #[serde(default = "default_debounce_ms")]
    pub search_debounce_ms: u64,
}

impl Default for LoadoutConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            namespace: default_namespace(),
            catalog: default_catalog(),
            storage: default_storage(),
            menu_order: default_menu_order(),
            exclude_from_search: default_exclude(),
            search_debounce_ms: default_debounce_ms(),
        }
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    EmptyNamespace,
    NamespaceHasSeparator { namespace: String },
    DebounceOutOfRange { ms: u64 },
    NotFound { searched: Vec<PathBuf> },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Yaml(e) => write!(f, "YAML parse error: {}", e),
            Self::EmptyNamespace => write!(f, "namespace must not be empty"),
            Self::NamespaceHasSeparator { namespace } => {
                write!(f, "namespace '{}' must not contain ':'", namespace)
            }
            Self::DebounceOutOfRange { ms } => {
                write!(f, "search_debounce_ms {} outside 50..=1000", ms)
            }
            Self::NotFound { searched } => {
                write!(f, "no config file found, searched: {:?}", searched)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Yaml(e)
    }
}

impl LoadoutConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: LoadoutConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a string (useful for testing)
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: LoadoutConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Search for config file in standard locations
    pub fn discover(start_dir: &Path) -> Result<(PathBuf, Self), ConfigError> {
        let names = [
            "loadout.yaml",
            "loadout.yml",
            ".loadout.yaml",
            ".loadout.yml",
        ];
        let mut searched = Vec::new();

        // Check environment variable first
        if let Ok(env_path) = std::env::var("LOADOUT_CONFIG") {
            let path = PathBuf::from(&env_path);
            if path.exists() {
                return Ok((path.clone(), Self::load(&path)?));
            }
            searched.push(path);
        }

        // Search current directory and parents
        let mut dir = Some(start_dir);
        while let Some(current) = dir {
            for name in &names {
                let path = current.join(name);
                if path.exists() {
                    return Ok((path.clone(), Self::load(&path)?));
                }
                searched.push(path);
            }
            dir = current.parent();
        }

        Err(ConfigError::NotFound { searched })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }
        if self.namespace.contains(':') {
            return Err(ConfigError::NamespaceHasSeparator {
                namespace: self.namespace.clone(),
            });
        }
        if !(50..=1000).contains(&self.search_debounce_ms) {
            return Err(ConfigError::DebounceOutOfRange {
                ms: self.search_debounce_ms,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config = LoadoutConfig::from_str("{}").unwrap();
        assert_eq!(config.namespace, "wf");
        assert_eq!(config.catalog, PathBuf::from("items.json"));
        assert_eq!(config.search_debounce_ms, 250);
        assert_eq!(config.exclude_from_search, vec!["kuva", "tenet", "coda"]);
    }

    #[test]
    fn test_parse_overrides() {
        let yaml = r#"
title: My Tracker
namespace: trk
catalog: data/catalog.json
search_debounce_ms: 200
"#;
        let config = LoadoutConfig::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Tracker");
        assert_eq!(config.namespace, "trk");
        assert_eq!(config.catalog, PathBuf::from("data/catalog.json"));
        assert_eq!(config.search_debounce_ms, 200);
    }

    #[test]
    fn test_namespace_validation() {
        let result = LoadoutConfig::from_str("namespace: \"\"");
        assert!(matches!(result, Err(ConfigError::EmptyNamespace)));

        let result = LoadoutConfig::from_str("namespace: \"a:b\"");
        assert!(matches!(
            result,
            Err(ConfigError::NamespaceHasSeparator { .. })
        ));
    }

    #[test]
    fn test_debounce_range() {
        let result = LoadoutConfig::from_str("search_debounce_ms: 10");
        assert!(matches!(result, Err(ConfigError::DebounceOutOfRange { ms: 10 })));
        assert!(LoadoutConfig::from_str("search_debounce_ms: 1000").is_ok());
    }
}
