//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::core::access::Role;
use crate::core::duty::DEFAULT_DUTY_RATE;
use crate::core::workspace::Workspace;

/// Usuppli configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Role used for tariff table access
    pub role: Option<Role>,

    /// Destination country used when a product has none
    pub default_country: Option<String>,

    /// Duty rate applied when no tariff entry exists
    pub default_duty_rate: Option<f64>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(workspace: Option<&Workspace>) -> Self {
        let global = Self::global_config_path();
        let local = workspace.map(|w| w.config_path());
        let mut config = Self::load_layers(global.as_deref(), local.as_deref());

        // Environment variables win over files
        if let Ok(role) = std::env::var("USUPPLI_ROLE") {
            match role.parse::<Role>() {
                Ok(role) => config.role = Some(role),
                Err(e) => warn!(error = %e, "ignoring USUPPLI_ROLE"),
            }
        }
        if let Ok(country) = std::env::var("USUPPLI_COUNTRY") {
            config.default_country = Some(country);
        }

        config
    }

    /// Merge the global file and then the workspace file over built-in defaults
    pub fn load_layers(global: Option<&Path>, workspace: Option<&Path>) -> Self {
        let mut config = Config::default();

        for path in [global, workspace].into_iter().flatten() {
            if let Some(layer) = Self::load_from_path(path) {
                config.merge(layer);
            }
        }

        config
    }

    /// Read one config file. Missing files are skipped, malformed ones logged and skipped.
    pub fn load_from_path(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Option<Config>>(&contents) {
            Ok(config) => Some(config.unwrap_or_default()),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "usuppli")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.role.is_some() {
            self.role = other.role;
        }
        if other.default_country.is_some() {
            self.default_country = other.default_country;
        }
        if other.default_duty_rate.is_some() {
            self.default_duty_rate = other.default_duty_rate;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Effective role, read-only viewer when unset
    pub fn role(&self) -> Role {
        self.role.unwrap_or_default()
    }

    /// Effective fallback duty rate
    pub fn default_duty_rate(&self) -> f64 {
        self.default_duty_rate
            .filter(|rate| rate.is_finite())
            .unwrap_or(DEFAULT_DUTY_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.role(), Role::Viewer);
        assert_eq!(config.default_duty_rate(), 0.15);
    }

    #[test]
    fn test_workspace_layer_overrides_global() {
        let tmp = tempdir().unwrap();
        let global = tmp.path().join("global.yaml");
        let local = tmp.path().join("local.yaml");
        std::fs::write(&global, "role: admin\ndefault_country: USA\n").unwrap();
        std::fs::write(&local, "role: super_admin\n").unwrap();

        let config = Config::load_layers(Some(global.as_path()), Some(local.as_path()));
        assert_eq!(config.role(), Role::SuperAdmin);
        assert_eq!(config.default_country.as_deref(), Some("USA"));
    }

    #[test]
    fn test_commented_out_file_is_empty_layer() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "# role: super_admin\n").unwrap();

        assert_eq!(Config::load_from_path(&path), Some(Config::default()));
    }

    #[test]
    fn test_malformed_file_is_skipped() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "role: [not, a, role\n").unwrap();

        assert!(Config::load_from_path(&path).is_none());
        assert_eq!(Config::load_layers(Some(path.as_path()), None), Config::default());
    }

    #[test]
    fn test_missing_files_are_skipped() {
        let tmp = tempdir().unwrap();
        let config = Config::load_layers(Some(tmp.path().join("nope.yaml").as_path()), None);
        assert_eq!(config, Config::default());
    }
}
