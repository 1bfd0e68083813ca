//! Product record - the input to landed-cost estimation
//!
//! Products are plain records supplied by whatever owns data entry. They are
//! read from YAML (default) or JSON files and never written back by this crate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::core::duty::{DutyResolver, ResolvedDuty};
use crate::core::landed::{LandedCost, LandedCostEngine, PricedLandedCost};
use crate::core::ledger::{coerce_amount, CostLine, CostLineLedger};
use crate::core::logistics::{Dimensions, LogisticsCosts};

/// A product with its cost inputs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier (SKU or internal id)
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Destination country used for duty when none is given explicitly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// FOB cost components
    #[serde(default)]
    pub cost_lines: Vec<CostLine>,

    /// Shipping dimensions of one unit
    #[serde(default)]
    pub dimensions: Dimensions,

    /// Freight, insurance, and other per-unit logistics costs
    #[serde(default)]
    pub logistics: LogisticsCosts,

    /// Product-specific duty rates by country (fraction, 0.2 = 20%)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub duty_overrides: BTreeMap<String, f64>,

    /// Extra named per-unit fees, charged as "other" logistics cost
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_fees: BTreeMap<String, f64>,

    /// Intended shelf price, for margin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_retail_price: Option<f64>,
}

/// Full costing of a product for one destination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductCosting {
    pub product_id: String,
    pub country: String,
    pub duty: ResolvedDuty,
    pub volumetric_weight_kg: f64,
    pub chargeable_weight_kg: f64,
    pub landed: LandedCost,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priced: Option<PricedLandedCost>,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cost_lines: CostLineLedger::with_default_lines().lines().to_vec(),
            ..Self::default()
        }
    }

    /// Load a product from a `.json` or YAML file
    pub fn load(path: &Path) -> Result<Self, ProductError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ProductError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_str(&contents).map_err(|e| ProductError::Json {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        } else {
            serde_yml::from_str(&contents).map_err(|e| ProductError::Yaml {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
    }

    /// The product's cost lines as a ledger
    pub fn ledger(&self) -> CostLineLedger {
        CostLineLedger::from_lines(self.cost_lines.clone())
    }

    /// Sum of the additional fees; negative or non-finite fees count as 0
    pub fn additional_fees_total(&self) -> f64 {
        self.additional_fees.values().copied().map(coerce_amount).sum()
    }

    /// Logistics costs with additional fees folded into `other`
    pub fn logistics_costs(&self) -> LogisticsCosts {
        LogisticsCosts::new(
            self.logistics.freight,
            self.logistics.insurance,
            coerce_amount(self.logistics.other) + self.additional_fees_total(),
        )
    }

    /// The retail price used for margin, coerced like any other amount
    pub fn retail_price(&self) -> Option<f64> {
        self.target_retail_price.map(coerce_amount)
    }

    /// Effective duty rate for a destination
    pub fn resolve_duty(&self, resolver: &DutyResolver<'_>, country: &str) -> ResolvedDuty {
        resolver.resolve(country, &self.duty_overrides)
    }

    /// Landed cost for a destination, with profit and margin when a retail
    /// price is set
    pub fn landed_cost(&self, resolver: &DutyResolver<'_>, country: &str) -> ProductCosting {
        let duty = self.resolve_duty(resolver, country);
        let landed = LandedCostEngine::compute(
            &self.ledger(),
            &self.logistics_costs(),
            duty.rate_percent(),
        );

        ProductCosting {
            product_id: self.id.clone(),
            country: country.to_string(),
            duty,
            volumetric_weight_kg: self.dimensions.volumetric_weight(),
            chargeable_weight_kg: self.dimensions.chargeable_weight(),
            landed,
            priced: self.retail_price().map(|price| landed.with_retail(price)),
        }
    }
}

/// Errors reading product records
#[derive(Debug, Error)]
pub enum ProductError {
    #[error("failed to read product file {path:?}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {path:?}: {message}")]
    Yaml {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("invalid JSON in {path:?}: {message}")]
    Json {
        path: std::path::PathBuf,
        message: String,
    },
}
