//! Pricing simulation request/result exchanged with `POST /pricing/simulate`.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::Cents;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PricingSimulation {
    #[validate(length(min = 2, max = 100))]
    pub service_name: String,
    /// Direct cost of materials per service.
    #[validate(range(min = 0))]
    pub cost_cents: Cents,
    #[validate(range(min = 0.0, max = 100.0))]
    pub commission_percent: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub card_fee_percent: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub tax_percent: f64,
    #[validate(range(min = 0.0, max = 95.0))]
    pub desired_margin_percent: f64,
}

impl PricingSimulation {
    /// Total share of the price consumed by percentages, including margin.
    pub fn percent_load(&self) -> f64 {
        self.commission_percent + self.card_fee_percent + self.tax_percent + self.desired_margin_percent
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub suggested_price_cents: Cents,
    pub commission_cents: Cents,
    pub fees_cents: Cents,
    pub taxes_cents: Cents,
    pub margin_cents: Cents,
    pub margin_percent: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_above_limit_is_rejected() {
        let sim = PricingSimulation {
            service_name: "Corte".into(),
            cost_cents: 500,
            commission_percent: 40.0,
            card_fee_percent: 3.0,
            tax_percent: 6.0,
            desired_margin_percent: 99.0,
        };
        assert!(sim.validate().is_err());
    }

    #[test]
    fn percent_load_sums_all_shares() {
        let sim = PricingSimulation {
            service_name: "Barba".into(),
            cost_cents: 300,
            commission_percent: 40.0,
            card_fee_percent: 3.5,
            tax_percent: 6.5,
            desired_margin_percent: 20.0,
        };
        assert_eq!(sim.percent_load(), 70.0);
    }
}
