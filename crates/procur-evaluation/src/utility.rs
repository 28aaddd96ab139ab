use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Weights for the buyer-utility composite; defaults match §4.A exactly.
#[derive(Debug, Clone, Copy)]
pub struct BuyerUtilityWeights {
    pub cost: f64,
    pub features: f64,
    pub compliance: f64,
    pub sla: f64,
}

impl Default for BuyerUtilityWeights {
    fn default() -> Self {
        Self {
            cost: 0.40,
            features: 0.35,
            compliance: 0.15,
            sla: 0.10,
        }
    }
}

/// `cost_fit = 1` at or under budget, else falls off linearly over `3·budget`
/// (§4.A). Combined with feature/compliance/sla scores by `weights`, clamped to
/// `[0,1]`.
pub fn compute_buyer_utility(
    unit_price: Decimal,
    budget_per_unit: Decimal,
    feature_score: f64,
    compliance_score: f64,
    sla_score: f64,
    weights: BuyerUtilityWeights,
) -> f64 {
    let cost_fit = if unit_price <= budget_per_unit {
        1.0
    } else if budget_per_unit > Decimal::ZERO {
        let overrun = (unit_price - budget_per_unit) / (Decimal::from(3) * budget_per_unit);
        (1.0 - overrun.to_f64().unwrap_or(1.0)).max(0.0)
    } else {
        0.0
    };

    let utility = weights.cost * cost_fit
        + weights.features * feature_score
        + weights.compliance * compliance_score
        + weights.sla * sla_score;

    utility.clamp(0.0, 1.0)
}

/// `margin = clamp((price - floor) / max(list - floor, eps), 0, 1)`;
/// `seller_utility = clamp(0.9·margin + 0.1·0.5, 0, 1)`, falling back to the raw
/// margin if that composite is below `min_accept_threshold` (§4.A).
pub fn compute_seller_utility(
    price: Decimal,
    floor: Decimal,
    list: Decimal,
    min_accept_threshold: f64,
) -> f64 {
    let epsilon = Decimal::new(1, 2);
    let denom = (list - floor).max(epsilon);
    let margin = ((price - floor) / denom).to_f64().unwrap_or(0.0).clamp(0.0, 1.0);
    let composite = (0.9 * margin + 0.1 * 0.5).clamp(0.0, 1.0);
    if composite < min_accept_threshold {
        margin
    } else {
        composite
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn under_budget_cost_fit_is_perfect() {
        let utility = compute_buyer_utility(
            Decimal::new(1000, 0),
            Decimal::new(1200, 0),
            1.0,
            1.0,
            1.0,
            BuyerUtilityWeights::default(),
        );
        assert!((utility - 1.0).abs() < 1e-9);
    }

    #[test]
    fn seller_utility_at_floor_is_zero_margin() {
        let utility = compute_seller_utility(
            Decimal::new(800, 0),
            Decimal::new(800, 0),
            Decimal::new(1200, 0),
            0.10,
        );
        assert!((utility - 0.05).abs() < 1e-9);
    }

    #[test]
    fn seller_utility_at_list_price_is_full_margin() {
        let utility = compute_seller_utility(
            Decimal::new(1200, 0),
            Decimal::new(800, 0),
            Decimal::new(1200, 0),
            0.10,
        );
        assert!((utility - 0.95).abs() < 1e-9);
    }
}
