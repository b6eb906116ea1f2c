use crate::error::{HannaError, Result};
use crate::repository::DEFAULT_MAX_NAME_RETRIES;
use crate::store::SortOrder;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
pub const DATABASE_FILENAME: &str = "hanna.sqlite";

/// Keys accepted by [`HannaConfig::get`] and [`HannaConfig::set`].
pub const CONFIG_KEYS: [&str; 4] = [
    "database",
    "max_name_retries",
    "default_sort",
    "reserved_names",
];

/// Configuration for hanna, stored as config.json in the data directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HannaConfig {
    /// Database file; `None` means `hanna.sqlite` in the data directory
    #[serde(default)]
    pub database: Option<PathBuf>,

    /// How many suffixed names a save tries before giving up on a taken name
    #[serde(default = "default_max_name_retries")]
    pub max_name_retries: u32,

    /// Sort key used by `list` when none is given
    #[serde(default = "default_sort")]
    pub default_sort: String,

    /// Host identifiers attribute names must not shadow
    #[serde(default)]
    pub reserved_names: Vec<String>,
}

fn default_max_name_retries() -> u32 {
    DEFAULT_MAX_NAME_RETRIES
}

fn default_sort() -> String {
    SortOrder::default().key().to_string()
}

impl Default for HannaConfig {
    fn default() -> Self {
        Self {
            database: None,
            max_name_retries: default_max_name_retries(),
            default_sort: default_sort(),
            reserved_names: Vec::new(),
        }
    }
}

impl HannaConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(HannaError::Io)?;
        let config: HannaConfig =
            serde_json::from_str(&content).map_err(HannaError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(HannaError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(HannaError::Serialization)?;
        fs::write(config_path, content).map_err(HannaError::Io)?;
        Ok(())
    }

    /// Database file to open, relative paths resolved against `data_dir`
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        match &self.database {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => data_dir.join(path),
            None => data_dir.join(DATABASE_FILENAME),
        }
    }

    pub fn sort_order(&self) -> SortOrder {
        SortOrder::parse(&self.default_sort)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "database" => Some(
                self.database
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),
            "max_name_retries" => Some(self.max_name_retries.to_string()),
            "default_sort" => Some(self.default_sort.clone()),
            "reserved_names" => Some(self.reserved_names.join(",")),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        let value = value.trim();
        match key {
            "database" => {
                self.database = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "max_name_retries" => {
                self.max_name_retries = value
                    .parse()
                    .map_err(|_| format!("Invalid number for max_name_retries: {}", value))?;
            }
            "default_sort" => {
                if !SortOrder::ALL.iter().any(|s| s.key() == value) {
                    let keys: Vec<_> = SortOrder::ALL.iter().map(|s| s.key()).collect();
                    return Err(format!(
                        "Invalid sort '{}', expected one of: {}",
                        value,
                        keys.join(", ")
                    ));
                }
                self.default_sort = value.to_string();
            }
            "reserved_names" => {
                self.reserved_names = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
            }
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = HannaConfig::default();
        assert_eq!(config.max_name_retries, 99);
        assert_eq!(config.default_sort, "name");
        assert!(config.database.is_none());
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempdir().unwrap();
        let config = HannaConfig::load(dir.path().join("nothing-here")).unwrap();
        assert_eq!(config, HannaConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("hanna");

        let mut config = HannaConfig::default();
        config.set("default_sort", "-modified").unwrap();
        config.set("reserved_names", "page, post ,").unwrap();
        config.save(&nested).unwrap();

        let loaded = HannaConfig::load(&nested).unwrap();
        assert_eq!(loaded.sort_order(), SortOrder::ModifiedDesc);
        assert_eq!(loaded.reserved_names, ["page", "post"]);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: HannaConfig = serde_json::from_str(r#"{"max_name_retries": 3}"#).unwrap();
        assert_eq!(config.max_name_retries, 3);
        assert_eq!(config.default_sort, "name");
    }

    #[test]
    fn test_database_path() {
        let data = Path::new("/data/hanna");
        let mut config = HannaConfig::default();
        assert_eq!(config.database_path(data), data.join("hanna.sqlite"));
        config.set("database", "other.db").unwrap();
        assert_eq!(config.database_path(data), data.join("other.db"));
        config.set("database", "").unwrap();
        assert!(config.database.is_none());
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = HannaConfig::default();
        assert!(config.set("max_name_retries", "lots").is_err());
        assert!(config.set("default_sort", "size").is_err());
        assert!(config.set("colour", "red").is_err());
        assert_eq!(config, HannaConfig::default());
    }

    #[test]
    fn test_get_every_key() {
        let config = HannaConfig::default();
        for key in CONFIG_KEYS {
            assert!(config.get(key).is_some(), "{}", key);
        }
        assert_eq!(config.get("bogus"), None);
    }
}
