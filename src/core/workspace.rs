//! Workspace discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::access::TariffAccess;
use crate::core::tariff::{JsonFilePersistence, TariffRateStore};

/// Name of the workspace marker directory
pub const WORKSPACE_DIR: &str = ".usuppli";

/// Represents a Usuppli workspace
#[derive(Debug)]
pub struct Workspace {
    /// Root directory of the workspace (parent of .usuppli/)
    root: PathBuf,
}

impl Workspace {
    /// Find workspace root by walking up from the current directory
    pub fn discover() -> Result<Self, WorkspaceError> {
        let current = std::env::current_dir().map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find workspace root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, WorkspaceError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        loop {
            if current.join(WORKSPACE_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(WorkspaceError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Use `path` if given, otherwise discover from the current directory
    pub fn locate(path: Option<&Path>) -> Result<Self, WorkspaceError> {
        match path {
            Some(path) => Self::discover_from(path),
            None => Self::discover(),
        }
    }

    /// Create a new workspace at the given path
    pub fn init(path: &Path) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(WORKSPACE_DIR).exists() {
            return Err(WorkspaceError::AlreadyExists(root));
        }

        Self::create_structure(root)
    }

    /// Initialize even if .usuppli/ exists, rewriting the default config
    pub fn init_force(path: &Path) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::create_structure(root)
    }

    fn create_structure(root: PathBuf) -> Result<Self, WorkspaceError> {
        let workspace = Self { root };

        std::fs::create_dir_all(workspace.config_dir())
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        std::fs::create_dir_all(workspace.products_dir())
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        std::fs::write(workspace.config_path(), Self::default_config())
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        Ok(workspace)
    }

    fn default_config() -> &'static str {
        r#"# Usuppli Workspace Configuration

# Role used for tariff table access (viewer, staff, admin, super_admin).
# Only super_admin may change global rates.
# role: viewer

# Destination country used when a product has none
# default_country: USA

# Duty rate applied when no tariff entry exists (fraction, 0.15 = 15%)
# default_duty_rate: 0.15

# Default output format (auto, yaml, json, tsv, csv, md)
# default_format: auto
"#
    }

    /// Get the workspace root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .usuppli configuration directory
    pub fn config_dir(&self) -> PathBuf {
        self.root.join(WORKSPACE_DIR)
    }

    /// Path of the workspace config file
    pub fn config_path(&self) -> PathBuf {
        self.config_dir().join("config.yaml")
    }

    /// Conventional directory for product records
    pub fn products_dir(&self) -> PathBuf {
        self.root.join("products")
    }

    /// File-backed persistence for this workspace's tariff table
    pub fn tariff_persistence(&self) -> JsonFilePersistence {
        JsonFilePersistence::in_dir(&self.config_dir())
    }

    /// Open the workspace tariff table with the given capability
    pub fn tariff_store(&self, access: TariffAccess) -> TariffRateStore {
        TariffRateStore::open(self.tariff_persistence(), access)
    }
}

/// Errors that can occur during workspace operations
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("not a Usuppli workspace (searched from {searched_from:?}). Run 'usuppli init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("Usuppli workspace already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_workspace_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let workspace = Workspace::init(tmp.path()).unwrap();

        assert!(workspace.config_dir().is_dir());
        assert!(workspace.config_path().exists());
        assert!(workspace.products_dir().is_dir());
    }

    #[test]
    fn test_workspace_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path()).unwrap();

        let err = Workspace::init(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::AlreadyExists(_)));

        assert!(Workspace::init_force(tmp.path()).is_ok());
    }

    #[test]
    fn test_workspace_discover_from_subdir() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("products/apparel");
        std::fs::create_dir_all(&subdir).unwrap();

        let workspace = Workspace::discover_from(&subdir).unwrap();
        assert_eq!(
            workspace.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_workspace_discover_fails_without_marker() {
        let tmp = tempdir().unwrap();
        let err = Workspace::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound { .. }));
    }

    #[test]
    fn test_tariff_store_lives_in_config_dir() {
        let tmp = tempdir().unwrap();
        let workspace = Workspace::init(tmp.path()).unwrap();

        let mut store = workspace.tariff_store(TariffAccess::ReadWrite);
        store.update_rate("Nigeria", "0.2").unwrap();

        assert!(workspace
            .config_dir()
            .join("usuppli_tariff_rates.json")
            .exists());
        assert_eq!(
            workspace.tariff_store(TariffAccess::ReadOnly).rate("Nigeria"),
            Some(0.2)
        );
    }
}
