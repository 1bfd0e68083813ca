//! Core module - costing engine, tariff table, and supporting types

pub mod access;
pub mod config;
pub mod duty;
pub mod landed;
pub mod ledger;
pub mod logging;
pub mod logistics;
pub mod tariff;
pub mod workspace;

pub use access::{Role, TariffAccess};
pub use config::Config;
pub use duty::{resolve_duty, DutyResolver, DutySource, ResolvedDuty, DEFAULT_DUTY_RATE};
pub use landed::{LandedCost, LandedCostEngine, PricedLandedCost};
pub use ledger::{CostLine, CostLineLedger, LineField};
pub use logistics::{Dimensions, LogisticsCosts, VOLUMETRIC_DIVISOR};
pub use tariff::{
    default_rates, JsonFilePersistence, MemoryPersistence, TariffError, TariffPersistence,
    TariffRateStore, TARIFF_STORAGE_KEY,
};
pub use workspace::{Workspace, WorkspaceError};
