//! Global tariff table - country duty rates persisted to local storage
//!
//! The store is an explicit object: it owns a [`TariffPersistence`] adapter and
//! the [`TariffAccess`] capability of its caller. Every mutation is written
//! through to the adapter immediately. A missing or unreadable blob is never an
//! error to the caller; the store silently starts from the built-in defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::access::TariffAccess;
use crate::core::ledger::leading_number;

/// Fixed storage key for the persisted tariff blob
pub const TARIFF_STORAGE_KEY: &str = "usuppli_tariff_rates";

/// Built-in global rates, restored by [`TariffRateStore::reset_to_defaults`]
pub const DEFAULT_TARIFF_RATES: [(&str, f64); 5] = [
    ("USA", 0.156),
    ("South Africa", 0.45),
    ("Nigeria", 0.35),
    ("Tanzania", 0.35),
    ("Bahamas", 0.45),
];

/// The default rate table as an owned map
pub fn default_rates() -> BTreeMap<String, f64> {
    DEFAULT_TARIFF_RATES
        .iter()
        .map(|(country, rate)| (country.to_string(), *rate))
        .collect()
}

/// Parse a rate typed by a user from its leading number ("20%" reads as 20).
/// Input with no leading number becomes 0; anything else is kept as-is,
/// including values outside 0..=1.
pub fn parse_rate(raw: &str) -> f64 {
    leading_number(raw).unwrap_or(0.0)
}

/// Errors from tariff table operations
#[derive(Debug, Error)]
pub enum TariffError {
    #[error("tariff table is read-only for this role (super_admin required)")]
    ReadOnly,

    #[error("tariff storage error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode tariff table: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Storage backend for the serialized tariff blob
pub trait TariffPersistence: std::fmt::Debug {
    /// Read the stored blob, `None` if nothing has been saved
    fn load(&self) -> Result<Option<String>, TariffError>;

    /// Replace the stored blob
    fn save(&mut self, blob: &str) -> Result<(), TariffError>;

    /// Remove the stored blob
    fn clear(&mut self) -> Result<(), TariffError>;
}

/// In-process storage, for tests and embedding
#[derive(Debug, Default, Clone)]
pub struct MemoryPersistence {
    blob: Option<String>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already-stored blob
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Some(blob.into()),
        }
    }
}

impl TariffPersistence for MemoryPersistence {
    fn load(&self) -> Result<Option<String>, TariffError> {
        Ok(self.blob.clone())
    }

    fn save(&mut self, blob: &str) -> Result<(), TariffError> {
        self.blob = Some(blob.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), TariffError> {
        self.blob = None;
        Ok(())
    }
}

/// One JSON file named after [`TARIFF_STORAGE_KEY`]
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    /// Store the blob at an explicit path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store the blob under the fixed key inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(format!("{}.json", TARIFF_STORAGE_KEY)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> TariffError {
        TariffError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TariffPersistence for JsonFilePersistence {
    fn load(&self) -> Result<Option<String>, TariffError> {
        if !self.path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&self.path)
            .map(Some)
            .map_err(|e| self.io_error(e))
    }

    fn save(&mut self, blob: &str) -> Result<(), TariffError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        std::fs::write(&self.path, blob).map_err(|e| self.io_error(e))
    }

    fn clear(&mut self) -> Result<(), TariffError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(|e| self.io_error(e))?;
        }
        Ok(())
    }
}

/// Serialized form of the tariff table
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TariffState {
    rates: BTreeMap<String, f64>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    locked: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl Default for TariffState {
    fn default() -> Self {
        Self {
            rates: default_rates(),
            locked: BTreeSet::new(),
            updated_at: None,
        }
    }
}

/// Accepted blob layouts; a bare `country -> rate` map is the older format
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredBlob {
    Current(TariffState),
    Legacy(BTreeMap<String, f64>),
}

/// Process-wide country duty table with reset-to-default
#[derive(Debug)]
pub struct TariffRateStore {
    persistence: Box<dyn TariffPersistence>,
    access: TariffAccess,
    state: TariffState,
}

impl TariffRateStore {
    /// Open the store, loading persisted state or falling back to defaults
    pub fn open(persistence: impl TariffPersistence + 'static, access: TariffAccess) -> Self {
        let state = load_state(&persistence);
        Self {
            persistence: Box::new(persistence),
            access,
            state,
        }
    }

    /// Current working set of rates
    pub fn rates(&self) -> &BTreeMap<String, f64> {
        &self.state.rates
    }

    /// Rate for one country, if the table has an entry
    pub fn rate(&self, country: &str) -> Option<f64> {
        self.state.rates.get(country_key(country)).copied()
    }

    /// Countries whose global rate wins over product overrides
    pub fn locked(&self) -> &BTreeSet<String> {
        &self.state.locked
    }

    pub fn is_locked(&self, country: &str) -> bool {
        self.state.locked.contains(country_key(country))
    }

    pub fn access(&self) -> TariffAccess {
        self.access
    }

    /// When the table was last changed, `None` for untouched defaults
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.state.updated_at
    }

    /// True when the working set differs from the built-in defaults
    pub fn is_customized(&self) -> bool {
        self.state.rates != default_rates() || !self.state.locked.is_empty()
    }

    /// The storage adapter backing this store
    pub fn persistence(&self) -> &dyn TariffPersistence {
        self.persistence.as_ref()
    }

    /// Set a country's rate from raw user input and persist the table.
    ///
    /// Input is read like a form field: the leading number is used and
    /// anything without one stores 0. Returns the stored rate.
    pub fn update_rate(&mut self, country: &str, raw: &str) -> Result<f64, TariffError> {
        self.set_rate(country, parse_rate(raw))
    }

    /// Set a country's rate and persist the table. Non-finite rates store 0.
    ///
    /// On a storage error the in-memory table is left unchanged.
    pub fn set_rate(&mut self, country: &str, rate: f64) -> Result<f64, TariffError> {
        self.ensure_writable()?;

        let country = country_key(country);
        let rate = if rate.is_finite() { rate } else { 0.0 };
        if !(0.0..=1.0).contains(&rate) {
            warn!(country, rate, "tariff rate outside 0..=1 stored as entered");
        }

        let mut next = self.state.clone();
        next.rates.insert(country.to_string(), rate);
        self.commit(next)?;
        Ok(rate)
    }

    /// Restore the built-in rates, drop all locks, and clear persisted state
    pub fn reset_to_defaults(&mut self) -> Result<(), TariffError> {
        self.ensure_writable()?;
        self.persistence.clear()?;
        self.state = TariffState::default();
        debug!("tariff table reset to defaults");
        Ok(())
    }

    /// Lock a country so its global rate overrides product-specific rates.
    /// Returns false if it was already locked.
    pub fn lock(&mut self, country: &str) -> Result<bool, TariffError> {
        self.ensure_writable()?;
        let country = country_key(country);
        if self.state.locked.contains(country) {
            return Ok(false);
        }

        let mut next = self.state.clone();
        next.locked.insert(country.to_string());
        self.commit(next)?;
        Ok(true)
    }

    /// Remove a country lock. Returns false if it was not locked.
    pub fn unlock(&mut self, country: &str) -> Result<bool, TariffError> {
        self.ensure_writable()?;
        let country = country_key(country);
        if !self.state.locked.contains(country) {
            return Ok(false);
        }

        let mut next = self.state.clone();
        next.locked.remove(country);
        self.commit(next)?;
        Ok(true)
    }

    fn ensure_writable(&self) -> Result<(), TariffError> {
        if self.access.can_write() {
            Ok(())
        } else {
            Err(TariffError::ReadOnly)
        }
    }

    /// Persist `next` and adopt it only once storage accepted it
    fn commit(&mut self, mut next: TariffState) -> Result<(), TariffError> {
        next.updated_at = Some(Utc::now());
        let blob = serde_json::to_string_pretty(&next)?;
        self.persistence.save(&blob)?;
        debug!(
            countries = next.rates.len(),
            locked = next.locked.len(),
            "tariff table saved"
        );
        self.state = next;
        Ok(())
    }
}

/// Table keys ignore surrounding whitespace
fn country_key(country: &str) -> &str {
    country.trim()
}

fn load_state(persistence: &dyn TariffPersistence) -> TariffState {
    let blob = match persistence.load() {
        Ok(Some(blob)) => blob,
        Ok(None) => {
            debug!("no persisted tariff table, using defaults");
            return TariffState::default();
        }
        Err(e) => {
            warn!(error = %e, "could not read tariff table, using defaults");
            return TariffState::default();
        }
    };

    match serde_json::from_str::<StoredBlob>(&blob) {
        Ok(StoredBlob::Current(state)) => {
            debug!(countries = state.rates.len(), "loaded tariff table");
            state
        }
        Ok(StoredBlob::Legacy(rates)) => {
            debug!(countries = rates.len(), "loaded legacy tariff table");
            TariffState {
                rates,
                ..TariffState::default()
            }
        }
        Err(e) => {
            warn!(error = %e, "persisted tariff table is corrupt, using defaults");
            TariffState::default()
        }
    }
}
