//! Package dimensions, freight weights, and logistics cost totals

use serde::{Deserialize, Serialize};

use crate::core::ledger::{coerce_amount, deserialize_amount};

/// Air-freight volumetric divisor (cm³ per kg)
pub const VOLUMETRIC_DIVISOR: f64 = 5000.0;

/// Shipping dimensions of one product unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dimensions {
    #[serde(deserialize_with = "deserialize_amount")]
    pub length_cm: f64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub width_cm: f64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub height_cm: f64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub weight_kg: f64,
}

impl Dimensions {
    pub fn new(length_cm: f64, width_cm: f64, height_cm: f64, weight_kg: f64) -> Self {
        Self {
            length_cm: coerce_amount(length_cm),
            width_cm: coerce_amount(width_cm),
            height_cm: coerce_amount(height_cm),
            weight_kg: coerce_amount(weight_kg),
        }
    }

    /// Volume-equivalent weight in kg: L × W × H / 5000
    pub fn volumetric_weight(&self) -> f64 {
        (self.length_cm * self.width_cm * self.height_cm) / VOLUMETRIC_DIVISOR
    }

    /// The weight a carrier bills for: the larger of actual and volumetric weight
    pub fn chargeable_weight(&self) -> f64 {
        self.weight_kg.max(self.volumetric_weight())
    }

    /// True when the carrier bills on volume rather than on actual weight
    pub fn is_volumetric(&self) -> bool {
        self.volumetric_weight() > self.weight_kg
    }
}

/// Per-unit logistics costs in USD, never negative. Duty is derived, never stored here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticsCosts {
    #[serde(deserialize_with = "deserialize_amount")]
    pub freight: f64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub insurance: f64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub other: f64,
}

impl LogisticsCosts {
    pub fn new(freight: f64, insurance: f64, other: f64) -> Self {
        Self {
            freight: coerce_amount(freight),
            insurance: coerce_amount(insurance),
            other: coerce_amount(other),
        }
    }

    /// Freight + duty + insurance + other
    pub fn total(&self, duty: f64) -> f64 {
        self.freight + duty + self.insurance + self.other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volumetric_weight() {
        let dims = Dimensions::new(40.0, 40.0, 20.0, 0.0);
        assert!((dims.volumetric_weight() - 12.8).abs() < 1e-9);
    }

    #[test]
    fn test_zero_dimensions() {
        let dims = Dimensions::default();
        assert_eq!(dims.volumetric_weight(), 0.0);
        assert_eq!(dims.chargeable_weight(), 0.0);
    }

    #[test]
    fn test_chargeable_weight_uses_volume_when_larger() {
        let dims = Dimensions::new(40.0, 40.0, 20.0, 5.0);
        assert!((dims.chargeable_weight() - 12.8).abs() < 1e-9);
        assert!(dims.is_volumetric());
    }

    #[test]
    fn test_chargeable_weight_uses_actual_when_heavier() {
        let dims = Dimensions::new(10.0, 10.0, 10.0, 3.0);
        assert_eq!(dims.chargeable_weight(), 3.0);
        assert!(!dims.is_volumetric());
    }

    #[test]
    fn test_chargeable_weight_never_below_actual() {
        let samples = [
            Dimensions::new(1.0, 1.0, 1.0, 0.0),
            Dimensions::new(50.0, 30.0, 10.0, 2.5),
            Dimensions::new(100.0, 80.0, 60.0, 150.0),
            Dimensions::new(0.0, 20.0, 20.0, 0.4),
        ];
        for dims in samples {
            assert!(dims.chargeable_weight() >= dims.weight_kg);
        }
    }

    #[test]
    fn test_negative_and_nan_costs_become_zero() {
        let costs = LogisticsCosts::new(-2.0, f64::NAN, 1.0);
        assert_eq!(costs, LogisticsCosts::new(0.0, 0.0, 1.0));

        let parsed: LogisticsCosts =
            serde_json::from_str(r#"{"freight": -5, "insurance": 0.5}"#).unwrap();
        assert_eq!(parsed.freight, 0.0);
        assert_eq!(parsed.insurance, 0.5);
        assert_eq!(parsed.other, 0.0);
    }

    #[test]
    fn test_logistics_total_includes_duty() {
        let costs = LogisticsCosts::new(2.0, 0.5, 0.25);
        assert!((costs.total(0.8) - 3.55).abs() < 1e-9);
    }

    #[test]
    fn test_dimensions_deserialize_with_missing_fields() {
        let dims: Dimensions = serde_yml::from_str("length_cm: 10\nweight_kg: 1.5\n").unwrap();
        assert_eq!(dims.length_cm, 10.0);
        assert_eq!(dims.width_cm, 0.0);
        assert_eq!(dims.weight_kg, 1.5);
    }
}
