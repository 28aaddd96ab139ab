use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A fixed, read-only seasonal demand/price/capacity adjustment for one calendar
/// month (§4.N). Twelve entries, baked in at compile time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeasonalPattern {
    pub month: u32,
    pub demand_multiplier: f64,
    pub price_multiplier: f64,
    pub capacity_multiplier: f64,
}

impl SeasonalPattern {
    /// The twelve-entry calendar table (§4.N), grounded in the reference seller
    /// market-context data: low-demand months concede a discount, quarter- and
    /// year-end rushes carry a premium.
    pub fn default_patterns() -> [SeasonalPattern; 12] {
        [
            SeasonalPattern { month: 1, demand_multiplier: 0.8, price_multiplier: 0.95, capacity_multiplier: 1.1 },
            SeasonalPattern { month: 2, demand_multiplier: 0.9, price_multiplier: 0.98, capacity_multiplier: 1.1 },
            SeasonalPattern { month: 3, demand_multiplier: 1.1, price_multiplier: 1.02, capacity_multiplier: 0.95 },
            SeasonalPattern { month: 4, demand_multiplier: 1.0, price_multiplier: 1.0, capacity_multiplier: 1.0 },
            SeasonalPattern { month: 5, demand_multiplier: 1.0, price_multiplier: 1.0, capacity_multiplier: 1.0 },
            SeasonalPattern { month: 6, demand_multiplier: 1.2, price_multiplier: 1.05, capacity_multiplier: 0.9 },
            SeasonalPattern { month: 7, demand_multiplier: 0.7, price_multiplier: 0.92, capacity_multiplier: 1.2 },
            SeasonalPattern { month: 8, demand_multiplier: 0.8, price_multiplier: 0.95, capacity_multiplier: 1.15 },
            SeasonalPattern { month: 9, demand_multiplier: 1.1, price_multiplier: 1.02, capacity_multiplier: 0.95 },
            SeasonalPattern { month: 10, demand_multiplier: 1.0, price_multiplier: 1.0, capacity_multiplier: 1.0 },
            SeasonalPattern { month: 11, demand_multiplier: 1.1, price_multiplier: 1.03, capacity_multiplier: 0.95 },
            SeasonalPattern { month: 12, demand_multiplier: 1.3, price_multiplier: 1.08, capacity_multiplier: 0.85 },
        ]
    }

    /// Looks up the pattern for `month` (1-12), falling back to a neutral pattern
    /// for an out-of-range value rather than panicking.
    pub fn for_month(month: u32) -> SeasonalPattern {
        Self::default_patterns()
            .into_iter()
            .find(|p| p.month == month)
            .unwrap_or(SeasonalPattern {
                month,
                demand_multiplier: 1.0,
                price_multiplier: 1.0,
                capacity_multiplier: 1.0,
            })
    }
}

/// Host-supplied competitive signal for a single negotiation (§3, §4.I). Absent by
/// default: every lookup degrades to a neutral no-op rather than failing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompetitiveContext {
    #[serde(default)]
    pub competitors_involved: Vec<String>,
    #[serde(default)]
    pub estimated_competitor_prices: BTreeMap<String, f64>,
    #[serde(default = "default_pressure")]
    pub competitive_pressure: f64,
}

fn default_pressure() -> f64 {
    0.5
}

impl CompetitiveContext {
    /// Lowest known competitor price discounted by 2%, or `None` if no competitor
    /// price is known (§4.N).
    pub fn price_to_beat(&self) -> Option<f64> {
        self.estimated_competitor_prices
            .values()
            .cloned()
            .fold(None, |acc, price| match acc {
                Some(min) if min <= price => Some(min),
                _ => Some(price),
            })
            .map(|lowest| lowest * 0.98)
    }
}
