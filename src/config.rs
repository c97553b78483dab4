use serde::{Deserialize, Serialize};

use crate::account::{Amount, ONE_UNIT};
use crate::error::RegistryError;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RegistryConfig {
    pub node: NodeConfig,
    #[serde(default)]
    pub rules: RegistryRules,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NodeConfig {
    pub db_path: String,
    pub log_level: String,
}

/// Validation constants a registry is deployed with.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct RegistryRules {
    #[serde(default = "default_min_payment")]
    pub min_payment: Amount,
    #[serde(default = "default_max_age")]
    pub max_age: u32,
    #[serde(default = "default_senior_age")]
    pub senior_age: u32,
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,
}

fn default_min_payment() -> Amount {
    ONE_UNIT
}

fn default_max_age() -> u32 {
    150
}

fn default_senior_age() -> u32 {
    65
}

fn default_max_call_depth() -> usize {
    64
}

impl Default for RegistryRules {
    fn default() -> Self {
        Self {
            min_payment: default_min_payment(),
            max_age: default_max_age(),
            senior_age: default_senior_age(),
            max_call_depth: default_max_call_depth(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            node: NodeConfig {
                db_path: "./data/registry".to_string(),
                log_level: "info".to_string(),
            },
            rules: RegistryRules::default(),
        }
    }
}

impl RegistryConfig {
    pub fn from_toml(s: &str) -> Result<Self, RegistryError> {
        toml::from_str(s).map_err(|e| RegistryError::ConfigError(e.to_string()))
    }

    /// Load the config at `path`, writing the defaults there if the file
    /// does not exist yet. A file that exists but does not parse is an error.
    pub fn load(path: &str) -> Result<Self, RegistryError> {
        if std::path::Path::new(path).exists() {
            let s = std::fs::read_to_string(path)
                .map_err(|e| RegistryError::ConfigError(format!("reading {}: {}", path, e)))?;
            Self::from_toml(&s)
        } else {
            let config = Self::default();
            if let Ok(s) = toml::to_string_pretty(&config) {
                let _ = std::fs::write(path, s);
            }
            Ok(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let rules = RegistryRules::default();
        assert_eq!(rules.min_payment, ONE_UNIT);
        assert_eq!(rules.max_age, 150);
        assert_eq!(rules.senior_age, 65);
    }

    #[test]
    fn test_rules_section_is_optional() {
        let config = RegistryConfig::from_toml(
            r#"
            [node]
            db_path = "/tmp/reg"
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.node.db_path, "/tmp/reg");
        assert_eq!(config.rules, RegistryRules::default());
    }

    #[test]
    fn test_partial_rules() {
        let config = RegistryConfig::from_toml(
            r#"
            [node]
            db_path = "db"
            log_level = "info"

            [rules]
            min_payment = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.rules.min_payment, 500);
        assert_eq!(config.rules.max_age, 150);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = RegistryConfig::default();
        let s = toml::to_string_pretty(&config).unwrap();
        assert_eq!(RegistryConfig::from_toml(&s).unwrap(), config);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        assert!(matches!(
            RegistryConfig::from_toml("node = 3"),
            Err(RegistryError::ConfigError(_))
        ));
    }

    #[test]
    fn test_load_malformed_file_is_error() {
        let path = std::env::temp_dir().join(format!("person_registry_bad_{}.toml", std::process::id()));
        std::fs::write(&path, "[rules]\nmin_payment = \"lots\"\n").unwrap();

        let result = RegistryConfig::load(&path.to_string_lossy());
        assert!(matches!(result, Err(RegistryError::ConfigError(_))));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file_writes_defaults() {
        let path = std::env::temp_dir().join(format!("person_registry_new_{}.toml", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let config = RegistryConfig::load(&path.to_string_lossy()).unwrap();
        assert_eq!(config, RegistryConfig::default());
        assert_eq!(RegistryConfig::load(&path.to_string_lossy()).unwrap(), config);
        let _ = std::fs::remove_file(&path);
    }
}
