//! Configuration management for Gymdesk
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (GYMDESK_* prefix, highest precedence)
//! 2. gymdesk.local.toml (gitignored, local overrides)
//! 3. gymdesk.toml (git-tracked, project config)
//! 4. ~/.config/gymdesk/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)
//!
//! ```toml
//! [permissions]
//! save_strategy = "transactional"
//!
//! [permissions.default_grant]
//! create = false
//! read = true
//! update = false
//! delete = false
//!
//! [editor]
//! show_all_roles = false
//!
//! [logging]
//! filter = "info,gymdesk_rbac=debug"
//! format = "compact"
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main Gymdesk configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GymdeskConfig {
    pub permissions: PermissionsConfig,
    pub editor: EditorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionsConfig {
    /// Grant applied when a user has no stored record for a resource.
    pub default_grant: DefaultGrantConfig,
    pub save_strategy: SaveStrategyConfig,
}

/// Operation flags of the fallback grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultGrantConfig {
    pub create: bool,
    pub read: bool,
    pub update: bool,
    pub delete: bool,
}

impl Default for DefaultGrantConfig {
    fn default() -> Self {
        Self {
            create: false,
            read: true,
            update: false,
            delete: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SaveStrategyConfig {
    /// Diff against the loaded grants and write one atomic batch.
    #[default]
    Transactional,
    /// Upsert every resource independently.
    FanOut,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// List every active user in the editor, not only ADMIN and USER.
    pub show_all_roles: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive. `RUST_LOG` wins when set.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Full,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

impl GymdeskConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Read a single TOML file, without layering.
    pub fn from_toml_file(path: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Create a development configuration
    pub fn development() -> Self {
        Self {
            editor: EditorConfig {
                show_all_roles: true,
            },
            logging: LoggingConfig {
                filter: "debug".to_string(),
                format: LogFormat::Full,
            },
            ..Default::default()
        }
    }

    /// Create a production configuration
    pub fn production() -> Self {
        Self {
            logging: LoggingConfig {
                filter: "info".to_string(),
                format: LogFormat::Compact,
            },
            ..Default::default()
        }
    }

    /// Check values serde cannot reject on its own.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.filter must not be empty".to_string(),
            ));
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
        let config = GymdeskConfig::default();
        assert_eq!(config.permissions.default_grant, DefaultGrantConfig::default());
        assert!(config.permissions.default_grant.read);
        assert!(!config.permissions.default_grant.delete);
        assert_eq!(
            config.permissions.save_strategy,
            SaveStrategyConfig::Transactional
        );
        assert!(!config.editor.show_all_roles);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_development_config() {
        let config = GymdeskConfig::development();
        assert!(config.editor.show_all_roles);
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn test_production_config() {
        let config = GymdeskConfig::production();
        assert!(!config.editor.show_all_roles);
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_from_toml_file() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("gymdesk.toml");
        std::fs::write(
            &path,
            r#"
[permissions]
save_strategy = "fan-out"

[permissions.default_grant]
read = false
"#,
        )
        .expect("Failed to write config");

        let config = GymdeskConfig::from_toml_file(&path).expect("Failed to read config");
        assert_eq!(config.permissions.save_strategy, SaveStrategyConfig::FanOut);
        assert!(!config.permissions.default_grant.read);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_from_toml_file_errors() {
        let temp_dir = tempdir().expect("Failed to create temp dir");

        let missing = GymdeskConfig::from_toml_file(temp_dir.path().join("absent.toml"));
        assert!(matches!(missing, Err(ConfigError::ReadError { .. })));

        let path = temp_dir.path().join("bad.toml");
        std::fs::write(&path, "[permissions]\nsave_strategy = \"sometimes\"\n")
            .expect("Failed to write config");
        let bad = GymdeskConfig::from_toml_file(&path);
        assert!(matches!(bad, Err(ConfigError::ParseError { .. })));

        let path = temp_dir.path().join("empty_filter.toml");
        std::fs::write(&path, "[logging]\nfilter = \"  \"\n").expect("Failed to write config");
        let invalid = GymdeskConfig::from_toml_file(&path);
        assert!(matches!(invalid, Err(ConfigError::ValidationError(_))));
    }
}
