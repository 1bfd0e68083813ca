//! Landed cost, profit, and margin

use serde::Serialize;

use crate::core::ledger::CostLineLedger;
use crate::core::logistics::LogisticsCosts;

/// Duty on an FOB subtotal at a percentage rate (10.0 = 10%)
pub fn calculated_duty(fob_subtotal: f64, duty_rate_percent: f64) -> f64 {
    fob_subtotal * duty_rate_percent / 100.0
}

/// Retail price minus landed cost
pub fn profit(target_retail_price: f64, total_landed_cost: f64) -> f64 {
    target_retail_price - total_landed_cost
}

/// Margin as a percentage of retail price. A zero retail price, or inputs
/// that would make the result non-finite, yield 0.
pub fn margin_percent(target_retail_price: f64, total_landed_cost: f64) -> f64 {
    if target_retail_price == 0.0 {
        return 0.0;
    }
    let margin = (target_retail_price - total_landed_cost) / target_retail_price * 100.0;
    if margin.is_finite() {
        margin
    } else {
        0.0
    }
}

/// Breakdown of a unit's total landed cost
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LandedCost {
    pub fob_subtotal: f64,
    pub freight: f64,
    pub duty_rate_percent: f64,
    pub duty: f64,
    pub insurance: f64,
    pub other: f64,
    pub total: f64,
}

impl LandedCost {
    /// Everything after the factory gate: freight + duty + insurance + other
    pub fn logistics_total(&self) -> f64 {
        self.total - self.fob_subtotal
    }

    pub fn profit(&self, target_retail_price: f64) -> f64 {
        profit(target_retail_price, self.total)
    }

    pub fn margin_percent(&self, target_retail_price: f64) -> f64 {
        margin_percent(target_retail_price, self.total)
    }

    /// Attach profit and margin against a retail price
    pub fn with_retail(self, target_retail_price: f64) -> PricedLandedCost {
        PricedLandedCost {
            landed: self,
            target_retail_price,
            profit: self.profit(target_retail_price),
            margin_percent: self.margin_percent(target_retail_price),
        }
    }
}

/// Landed cost together with its profitability at a retail price
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricedLandedCost {
    #[serde(flatten)]
    pub landed: LandedCost,
    pub target_retail_price: f64,
    pub profit: f64,
    pub margin_percent: f64,
}

/// Composes cost lines, logistics costs, and a duty rate into a landed cost
#[derive(Debug, Clone, Copy, Default)]
pub struct LandedCostEngine;

impl LandedCostEngine {
    /// Compute the landed cost breakdown.
    ///
    /// Duty is charged on the FOB subtotal only.
    pub fn compute(
        ledger: &CostLineLedger,
        logistics: &LogisticsCosts,
        duty_rate_percent: f64,
    ) -> LandedCost {
        let fob_subtotal = ledger.subtotal();
        let duty = calculated_duty(fob_subtotal, duty_rate_percent);
        let total = fob_subtotal + logistics.total(duty);

        LandedCost {
            fob_subtotal,
            freight: logistics.freight,
            duty_rate_percent,
            duty,
            insurance: logistics.insurance,
            other: logistics.other,
            total,
        }
    }
}
