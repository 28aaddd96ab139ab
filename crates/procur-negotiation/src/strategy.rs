use procur_types::{BuyerStrategy, CompetingOffer, Lever, Offer, OpponentModel, PaymentTerms};
use rust_decimal::Decimal;

/// How many consecutive rounds of flat offers count as a stalemate (§4.G).
pub const DEFAULT_MAX_STALLED_ROUNDS: u32 = 3;

/// Inputs the strategy selector needs beyond the negotiation state itself;
/// kept as a struct so round-loop callers don't have to thread individual
/// values through.
#[derive(Debug, Clone, Copy)]
pub struct StrategyContext<'a> {
    pub round: u32,
    pub stalemate_rounds: u32,
    pub max_stalled_rounds: u32,
    pub current_best_price: Decimal,
    pub competing_offers: &'a [CompetingOffer],
    pub opponent_model: &'a OpponentModel,
    pub last_payment_terms: Option<PaymentTerms>,
    pub stalemate_detected: bool,
    pub next_ladder_lever: Option<Lever>,
}

fn lever_to_buyer_strategy(lever: Lever) -> BuyerStrategy {
    match lever {
        Lever::Price => BuyerStrategy::PricePressure,
        Lever::Term => BuyerStrategy::TermTrade,
        Lever::Payment => BuyerStrategy::PaymentTrade,
        Lever::Value => BuyerStrategy::ValueAdd,
    }
}

/// §4.G buyer strategy selection, evaluated in the exact precedence order the
/// spec lists: competitor leverage, then stalled-ladder advancement, then the
/// round-keyed default ladder.
pub fn select_buyer_strategy(ctx: StrategyContext<'_>) -> BuyerStrategy {
    let cheaper_competitor = ctx
        .competing_offers
        .iter()
        .any(|offer| offer.unit_price <= ctx.current_best_price * Decimal::new(95, 2));
    if cheaper_competitor {
        return BuyerStrategy::PricePressure;
    }

    if ctx.stalemate_rounds >= ctx.max_stalled_rounds {
        if let Some(lever) = ctx.next_ladder_lever {
            return lever_to_buyer_strategy(lever);
        }
    }

    match ctx.round {
        1 => BuyerStrategy::PriceAnchor,
        2 if ctx.opponent_model.consecutive_no_price_moves > 0 => BuyerStrategy::TermTrade,
        3 if ctx.last_payment_terms == Some(PaymentTerms::Net45) => BuyerStrategy::PaymentTrade,
        _ if ctx.stalemate_detected => BuyerStrategy::Ultimatum,
        round if round >= 4 => BuyerStrategy::ValueAdd,
        _ => BuyerStrategy::PricePressure,
    }
}

/// Average per-round utility and TCO improvement over the trailing window
/// `history` (most recent last). `history` should contain the buyer's own
/// offers only, oldest first.
fn average_improvements(history: &[Offer]) -> (f64, Decimal) {
    let mut utility_deltas = Vec::new();
    let mut tco_deltas = Vec::new();
    for pair in history.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        if let (Some(prev_score), Some(cur_score)) = (&prev.score, &cur.score) {
            utility_deltas.push(cur_score.utility - prev_score.utility);
        }
        let prev_price = prev.components.unit_price;
        let cur_price = cur.components.unit_price;
        tco_deltas.push((prev_price - cur_price).abs());
    }
    let avg_utility = if utility_deltas.is_empty() {
        0.0
    } else {
        utility_deltas.iter().sum::<f64>() / utility_deltas.len() as f64
    };
    let avg_tco = if tco_deltas.is_empty() {
        Decimal::ZERO
    } else {
        tco_deltas.iter().sum::<Decimal>() / Decimal::from(tco_deltas.len() as u64)
    };
    (avg_utility, avg_tco)
}

/// §4.G stalemate detection: over the trailing 3 rounds, average utility
/// improvement under 0.01 **and** average TCO improvement under $50.
pub fn detect_stalemate(recent_own_offers: &[Offer]) -> bool {
    let window: Vec<Offer> = recent_own_offers
        .iter()
        .rev()
        .take(3)
        .rev()
        .cloned()
        .collect();
    if window.len() < 2 {
        return false;
    }
    let (avg_utility, avg_tco) = average_improvements(&window);
    avg_utility < 0.01 && avg_tco < Decimal::from(50)
}

#[cfg(test)]
mod tests {
    use super::*;
    use procur_types::OfferScore;
    use std::collections::BTreeMap;

    fn offer(price: i64, utility: f64) -> Offer {
        Offer {
            offer_id: "o".into(),
            request_id: "r".into(),
            vendor_id: "v".into(),
            components: procur_types::OfferComponents {
                unit_price: Decimal::new(price, 0),
                currency: "USD".into(),
                quantity: 10,
                term_months: 12,
                payment_terms: PaymentTerms::Net30,
                one_time_fees: BTreeMap::new(),
                warranty_support: None,
                exclusions: Vec::new(),
                notes: Vec::new(),
            },
            score: Some(OfferScore {
                spec_match: 1.0,
                tco_norm: 1.0,
                risk: 0.0,
                time: 1.0,
                utility,
                matched_features: Vec::new(),
                missing_features: Vec::new(),
            }),
            confidence: None,
            accepted: false,
        }
    }

    #[test]
    fn round_one_always_anchors() {
        let opponent = OpponentModel::seed(Decimal::new(800, 0), Decimal::new(1000, 0));
        let ctx = StrategyContext {
            round: 1,
            stalemate_rounds: 0,
            max_stalled_rounds: DEFAULT_MAX_STALLED_ROUNDS,
            current_best_price: Decimal::new(1000, 0),
            competing_offers: &[],
            opponent_model: &opponent,
            last_payment_terms: None,
            stalemate_detected: false,
            next_ladder_lever: None,
        };
        assert_eq!(select_buyer_strategy(ctx), BuyerStrategy::PriceAnchor);
    }

    #[test]
    fn cheaper_competitor_forces_price_pressure() {
        let opponent = OpponentModel::seed(Decimal::new(800, 0), Decimal::new(1000, 0));
        let ctx = StrategyContext {
            round: 1,
            stalemate_rounds: 0,
            max_stalled_rounds: DEFAULT_MAX_STALLED_ROUNDS,
            current_best_price: Decimal::new(1000, 0),
            competing_offers: &[CompetingOffer { vendor_id: "other".into(), unit_price: Decimal::new(900, 0) }],
            opponent_model: &opponent,
            last_payment_terms: None,
            stalemate_detected: false,
            next_ladder_lever: None,
        };
        assert_eq!(select_buyer_strategy(ctx), BuyerStrategy::PricePressure);
    }

    #[test]
    fn stagnant_offers_are_a_stalemate() {
        let offers = vec![offer(1000, 0.5), offer(999, 0.505), offer(998, 0.508)];
        assert!(detect_stalemate(&offers));
    }

    #[test]
    fn improving_offers_are_not_a_stalemate() {
        let offers = vec![offer(1000, 0.5), offer(900, 0.7), offer(800, 0.9)];
        assert!(!detect_stalemate(&offers));
    }
}
