use procur_types::PolicyResult;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Everything `should_close_deal` needs to evaluate the §4.G invariants and
/// the gap-narrowing heuristics.
#[derive(Debug, Clone)]
pub struct CloseInputs<'a> {
    pub tco: Decimal,
    pub budget_max: Option<Decimal>,
    pub buyer_utility: f64,
    pub seller_utility: f64,
    pub policy_result: &'a PolicyResult,
    pub price: Decimal,
    pub vendor_floor: Decimal,
    pub previous_opponent_offer: Option<Decimal>,
    pub latest_opponent_offer: Option<Decimal>,
    pub finalize_gap_abs: Decimal,
    pub finalize_gap_pct: f64,
}

pub const DEFAULT_BUYER_UTILITY_THRESHOLD: f64 = 0.75;
pub const DEFAULT_SELLER_UTILITY_THRESHOLD: f64 = 0.10;

/// Why `should_close_deal` returned true, kept for audit rationale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    GapBelowAbsoluteThreshold,
    GapBelowPercentThreshold,
    ThresholdsMetOutright,
}

/// §4.G `should_close_deal`. First every hard invariant must hold — TCO within
/// budget, both utility floors, a passing policy check, price at or above the
/// vendor's floor. Only then do the gap-narrowing heuristics decide *why* to
/// close; with the invariants already satisfied the negotiation is always
/// closeable, so the gap checks exist to pick the more informative reason.
pub fn should_close_deal(inputs: &CloseInputs<'_>) -> Option<CloseReason> {
    let invariants_hold = inputs.budget_max.map(|max| inputs.tco <= max).unwrap_or(true)
        && inputs.buyer_utility >= DEFAULT_BUYER_UTILITY_THRESHOLD
        && inputs.seller_utility >= DEFAULT_SELLER_UTILITY_THRESHOLD
        && inputs.policy_result.valid()
        && inputs.price >= inputs.vendor_floor;

    if !invariants_hold {
        return None;
    }

    if let (Some(previous), Some(latest)) = (inputs.previous_opponent_offer, inputs.latest_opponent_offer) {
        let moving_in_buyers_favor = latest <= previous;
        if moving_in_buyers_favor {
            let gap = (latest - previous).abs();
            if gap < inputs.finalize_gap_abs {
                return Some(CloseReason::GapBelowAbsoluteThreshold);
            }
            if latest > Decimal::ZERO {
                let pct = (gap / latest).to_f64().unwrap_or(1.0);
                if pct < inputs.finalize_gap_pct {
                    return Some(CloseReason::GapBelowPercentThreshold);
                }
            }
        }
    }

    Some(CloseReason::ThresholdsMetOutright)
}

/// §4.G acceptance probability, an explainability-only signal that never
/// drives `should_close_deal` itself: `logistic(8·(score − 0.7))` where
/// `score = 0.6·price_fit + 0.2·lever_fit + 0.2·utility`, damped by a fatigue
/// factor that decays with round number.
pub fn acceptance_probability(price_fit: f64, lever_fit: f64, utility: f64, round: u32) -> f64 {
    let score = 0.6 * price_fit + 0.2 * lever_fit + 0.2 * utility;
    let logistic = 1.0 / (1.0 + (-8.0 * (score - 0.7)).exp());
    let fatigue = (1.0 - round as f64 * 0.05).max(0.5);
    logistic * fatigue
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passing_policy() -> PolicyResult {
        PolicyResult::ok()
    }

    #[test]
    fn invariant_failure_blocks_close() {
        let policy = passing_policy();
        let inputs = CloseInputs {
            tco: Decimal::new(200_000, 0),
            budget_max: Some(Decimal::new(100_000, 0)),
            buyer_utility: 0.9,
            seller_utility: 0.5,
            policy_result: &policy,
            price: Decimal::new(900, 0),
            vendor_floor: Decimal::new(800, 0),
            previous_opponent_offer: None,
            latest_opponent_offer: None,
            finalize_gap_abs: Decimal::new(10, 0),
            finalize_gap_pct: 0.02,
        };
        assert!(should_close_deal(&inputs).is_none());
    }

    #[test]
    fn small_gap_closes_with_abs_reason() {
        let policy = passing_policy();
        let inputs = CloseInputs {
            tco: Decimal::new(90_000, 0),
            budget_max: Some(Decimal::new(100_000, 0)),
            buyer_utility: 0.9,
            seller_utility: 0.5,
            policy_result: &policy,
            price: Decimal::new(900, 0),
            vendor_floor: Decimal::new(800, 0),
            previous_opponent_offer: Some(Decimal::new(905, 0)),
            latest_opponent_offer: Some(Decimal::new(900, 0)),
            finalize_gap_abs: Decimal::new(10, 0),
            finalize_gap_pct: 0.02,
        };
        assert_eq!(should_close_deal(&inputs), Some(CloseReason::GapBelowAbsoluteThreshold));
    }

    #[test]
    fn acceptance_probability_decays_with_round() {
        let early = acceptance_probability(0.9, 0.8, 0.9, 1);
        let late = acceptance_probability(0.9, 0.8, 0.9, 10);
        assert!(late < early);
    }
}
