//! Duty rate resolution
//!
//! A product's effective duty rate for a destination country comes from one of
//! three places, highest precedence first:
//!
//! 1. an admin-locked global rate (only when the global table has an entry)
//! 2. the product's own override
//! 3. the global tariff table
//!
//! and otherwise the system default of 15%.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::core::tariff::TariffRateStore;

/// Rate applied when no other source has an entry
pub const DEFAULT_DUTY_RATE: f64 = 0.15;

/// Where a resolved rate came from, for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DutySource {
    /// Global rate enforced by an admin lock
    AdminLocked,
    /// Product-specific override
    PrecisionApplied,
    /// Global table or built-in default
    SystemDefault,
}

impl std::fmt::Display for DutySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DutySource::AdminLocked => write!(f, "Admin Locked"),
            DutySource::PrecisionApplied => write!(f, "Precision Applied"),
            DutySource::SystemDefault => write!(f, "System Default"),
        }
    }
}

/// A duty rate (fraction, 0.15 = 15%) with its source label
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedDuty {
    pub rate: f64,
    pub source: DutySource,
}

impl ResolvedDuty {
    /// The rate as a percentage, the form the landed-cost math takes
    pub fn rate_percent(&self) -> f64 {
        self.rate * 100.0
    }
}

/// Resolve a duty rate from explicit maps
pub fn resolve_duty(
    country: &str,
    product_overrides: &BTreeMap<String, f64>,
    global_rates: &BTreeMap<String, f64>,
    locked_countries: &BTreeSet<String>,
    default_rate: f64,
) -> ResolvedDuty {
    let country = country.trim();
    let global = global_rates.get(country).copied();

    if locked_countries.contains(country) {
        if let Some(rate) = global {
            return ResolvedDuty {
                rate,
                source: DutySource::AdminLocked,
            };
        }
    }

    if let Some(rate) = product_overrides.get(country).copied() {
        return ResolvedDuty {
            rate: if rate.is_finite() { rate } else { 0.0 },
            source: DutySource::PrecisionApplied,
        };
    }

    ResolvedDuty {
        rate: global.unwrap_or(default_rate),
        source: DutySource::SystemDefault,
    }
}

/// Resolves duty rates against a global table and lock set
#[derive(Debug, Clone, Copy)]
pub struct DutyResolver<'a> {
    global_rates: &'a BTreeMap<String, f64>,
    locked_countries: &'a BTreeSet<String>,
    default_rate: f64,
}

impl<'a> DutyResolver<'a> {
    pub fn new(
        global_rates: &'a BTreeMap<String, f64>,
        locked_countries: &'a BTreeSet<String>,
    ) -> Self {
        Self {
            global_rates,
            locked_countries,
            default_rate: DEFAULT_DUTY_RATE,
        }
    }

    /// Borrow the global table and locks from a tariff store
    pub fn from_store(store: &'a TariffRateStore) -> Self {
        Self::new(store.rates(), store.locked())
    }

    /// Replace the fallback rate used when no table has an entry
    pub fn with_default_rate(mut self, default_rate: f64) -> Self {
        self.default_rate = default_rate;
        self
    }

    pub fn default_rate(&self) -> f64 {
        self.default_rate
    }

    /// Resolve the effective rate for `country` given a product's overrides
    pub fn resolve(&self, country: &str, product_overrides: &BTreeMap<String, f64>) -> ResolvedDuty {
        resolve_duty(
            country,
            product_overrides,
            self.global_rates,
            self.locked_countries,
            self.default_rate,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::access::TariffAccess;
    use crate::core::tariff::MemoryPersistence;

    fn map(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn set(entries: &[&str]) -> BTreeSet<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_lock_wins_over_override() {
        let global = map(&[("USA", 0.10)]);
        let locked = set(&["USA"]);
        let overrides = map(&[("USA", 0.20)]);

        let resolved = DutyResolver::new(&global, &locked).resolve("USA", &overrides);
        assert_eq!(resolved.rate, 0.10);
        assert_eq!(resolved.source, DutySource::AdminLocked);
    }

    #[test]
    fn test_override_wins_over_unlocked_global() {
        let global = map(&[("USA", 0.10)]);
        let locked = BTreeSet::new();
        let overrides = map(&[("USA", 0.20)]);

        let resolved = DutyResolver::new(&global, &locked).resolve("USA", &overrides);
        assert_eq!(resolved.rate, 0.20);
        assert_eq!(resolved.source, DutySource::PrecisionApplied);
    }

    #[test]
    fn test_global_used_without_override() {
        let global = map(&[("Nigeria", 0.35)]);
        let locked = BTreeSet::new();

        let resolved = DutyResolver::new(&global, &locked).resolve("Nigeria", &BTreeMap::new());
        assert_eq!(resolved.rate, 0.35);
        assert_eq!(resolved.source, DutySource::SystemDefault);
    }

    #[test]
    fn test_fallback_to_default_rate() {
        let global = BTreeMap::new();
        let locked = BTreeSet::new();

        let resolved = DutyResolver::new(&global, &locked).resolve("Peru", &BTreeMap::new());
        assert_eq!(resolved.rate, 0.15);
        assert_eq!(resolved.source, DutySource::SystemDefault);
        assert!((resolved.rate_percent() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_locked_country_without_global_falls_through() {
        let global = BTreeMap::new();
        let locked = set(&["Kenya"]);
        let overrides = map(&[("Kenya", 0.22)]);
        let resolver = DutyResolver::new(&global, &locked);

        let resolved = resolver.resolve("Kenya", &overrides);
        assert_eq!(resolved.rate, 0.22);
        assert_eq!(resolved.source, DutySource::PrecisionApplied);

        let resolved = resolver.resolve("Kenya", &BTreeMap::new());
        assert_eq!(resolved.rate, DEFAULT_DUTY_RATE);
    }

    #[test]
    fn test_custom_default_rate() {
        let global = BTreeMap::new();
        let locked = BTreeSet::new();
        let resolver = DutyResolver::new(&global, &locked).with_default_rate(0.05);
        assert_eq!(resolver.resolve("Chile", &BTreeMap::new()).rate, 0.05);
    }

    #[test]
    fn test_resolver_reads_injected_store() {
        let mut store = TariffRateStore::open(MemoryPersistence::new(), TariffAccess::ReadWrite);
        store.update_rate("USA", "0.10").unwrap();
        store.lock("USA").unwrap();

        let overrides = map(&[("USA", 0.20), ("Bahamas", 0.30)]);
        let resolver = DutyResolver::from_store(&store);

        assert_eq!(resolver.resolve("USA", &overrides).rate, 0.10);
        assert_eq!(resolver.resolve("Bahamas", &overrides).rate, 0.30);
        assert_eq!(resolver.resolve("Tanzania", &overrides).rate, 0.35);
    }

    #[test]
    fn test_country_is_trimmed_before_lookup() {
        let mut store = TariffRateStore::open(MemoryPersistence::new(), TariffAccess::ReadWrite);
        store.update_rate(" USA", "0.2").unwrap();
        store.lock("USA ").unwrap();

        let resolved = DutyResolver::from_store(&store).resolve("  USA ", &BTreeMap::new());
        assert_eq!(resolved.rate, 0.2);
        assert_eq!(resolved.source, DutySource::AdminLocked);
    }

    #[test]
    fn test_non_finite_override_resolves_to_zero() {
        let global = BTreeMap::new();
        let locked = BTreeSet::new();
        let overrides = map(&[("Peru", f64::NAN)]);

        let resolved = DutyResolver::new(&global, &locked).resolve("Peru", &overrides);
        assert_eq!(resolved.rate, 0.0);
        assert_eq!(resolved.source, DutySource::PrecisionApplied);
    }

    #[test]
    fn test_source_labels() {
        assert_eq!(DutySource::AdminLocked.to_string(), "Admin Locked");
        assert_eq!(DutySource::PrecisionApplied.to_string(), "Precision Applied");
        assert_eq!(DutySource::SystemDefault.to_string(), "System Default");
    }
}
