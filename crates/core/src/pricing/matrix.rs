use rust_decimal::Decimal;

use crate::config::PricingConfig;
use crate::domain::matrix::{LaborMatrixTier, PartsMatrixTier};
use crate::money::{round_money, round_multiplier};

/// Read-only view over the configured pricing tiers, sorted ascending by
/// range minimum at construction.
///
/// Resolution is a documented linear scan: tier counts are small, and the
/// first-matching-tier-in-ascending-min-order tie-break must survive
/// overlapping ranges, which the data model permits.
#[derive(Clone, Debug)]
pub struct MatrixResolver {
    labor_tiers: Vec<LaborMatrixTier>,
    parts_tiers: Vec<PartsMatrixTier>,
    default_labor_rate: Decimal,
    default_parts_multiplier: Decimal,
}

impl MatrixResolver {
    pub fn new(
        mut labor_tiers: Vec<LaborMatrixTier>,
        mut parts_tiers: Vec<PartsMatrixTier>,
        pricing: &PricingConfig,
    ) -> Self {
        labor_tiers.sort_by(|a, b| a.min_hours.cmp(&b.min_hours));
        parts_tiers.sort_by(|a, b| a.min_cost.cmp(&b.min_cost));
        Self {
            labor_tiers,
            parts_tiers,
            default_labor_rate: pricing.default_labor_rate,
            default_parts_multiplier: pricing.default_parts_multiplier,
        }
    }

    /// First tier where `min_hours <= hours <= max_hours` (unbounded max
    /// matches everything above its min). Hours beyond every range bill at
    /// the highest tier's rate; no tiers configured falls back to the
    /// default rate. Never an error.
    pub fn labor_rate(&self, hours: Decimal) -> Decimal {
        if self.labor_tiers.is_empty() {
            return round_money(self.default_labor_rate);
        }

        for tier in &self.labor_tiers {
            let above_min = hours >= tier.min_hours;
            let below_max = tier.max_hours.map_or(true, |max| hours <= max);
            if above_min && below_max {
                return round_money(tier.rate_per_hour);
            }
        }

        // Past every configured range: last tier wins.
        round_money(self.labor_tiers[self.labor_tiers.len() - 1].rate_per_hour)
    }

    /// Same algorithm over part cost ranges, yielding a markup multiplier.
    pub fn parts_multiplier(&self, cost: Decimal) -> Decimal {
        if self.parts_tiers.is_empty() {
            return round_multiplier(self.default_parts_multiplier);
        }

        for tier in &self.parts_tiers {
            let above_min = cost >= tier.min_cost;
            let below_max = tier.max_cost.map_or(true, |max| cost <= max);
            if above_min && below_max {
                return round_multiplier(tier.multiplier);
            }
        }

        round_multiplier(self.parts_tiers[self.parts_tiers.len() - 1].multiplier)
    }
}
