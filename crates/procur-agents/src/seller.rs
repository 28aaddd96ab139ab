use procur_evaluation::utility::compute_seller_utility;
use procur_negotiation::enforce_exchange_requirements;
use procur_policy::{GuardrailService, PolicyEngine};
use procur_types::{
    BuyerStrategy, CompetitiveContext, GuardrailAlert, OfferComponents, PolicyResult, Request, SeasonalPattern,
    SellerStrategy, VendorNegotiationState, VendorProfile,
};
use rust_decimal::Decimal;

/// Picks the counter strategy from the buyer's last move and the vendor's
/// remaining headroom. Not named verbatim in the reference agents (which hardcode
/// their own heuristic); this mirrors their shape — price-relative-to-floor,
/// then round pressure, then whatever lever the buyer just pulled (§4.I).
fn determine_seller_strategy(
    buyer_offer: &OfferComponents,
    vendor: &VendorProfile,
    state: &VendorNegotiationState,
) -> SellerStrategy {
    let floor = vendor.guardrails.price_floor;
    if buyer_offer.unit_price < floor {
        return SellerStrategy::RejectBelowFloor;
    }
    if state.round <= 1 {
        return SellerStrategy::AnchorHigh;
    }
    if state.stalemate_rounds >= 2 {
        return SellerStrategy::CloseDeal;
    }
    match state.plan.current_strategy {
        BuyerStrategy::TermTrade if buyer_offer.term_months >= 24 => SellerStrategy::TermValue,
        BuyerStrategy::PaymentTrade if buyer_offer.payment_terms == procur_types::PaymentTerms::Net15 => {
            SellerStrategy::PaymentPremium
        }
        BuyerStrategy::Ultimatum => SellerStrategy::MinimalConcession,
        _ => SellerStrategy::GradualConcession,
    }
}

/// §4.I strategy formulas, evaluated against the vendor's current best ask
/// (`current`, the vendor's previous round price, or list price on round 1).
fn strategy_price(strategy: SellerStrategy, current: Decimal, floor: Decimal, list: Decimal, policy: &procur_types::ExchangePolicy, buyer_offer: &OfferComponents) -> Decimal {
    match strategy {
        SellerStrategy::AnchorHigh => (current * Decimal::new(115, 2)).max(floor * Decimal::new(13, 1)).max(list),
        SellerStrategy::RejectBelowFloor => (floor * Decimal::new(105, 2)).max(current * Decimal::new(102, 2)),
        SellerStrategy::MinimalConcession => (current - policy.min_step_abs).max(floor),
        SellerStrategy::TermValue => {
            if buyer_offer.term_months >= 24 {
                let discount = policy.term_discount_for(buyer_offer.term_months.saturating_sub(12));
                (current * Decimal::try_from(1.0 - discount).unwrap_or(Decimal::ONE)).max(floor)
            } else {
                current * Decimal::new(101, 2)
            }
        }
        SellerStrategy::PaymentPremium => {
            if buyer_offer.payment_terms == procur_types::PaymentTerms::Net15 {
                let discount = policy.payment_trade.get(&procur_types::PaymentTerms::Net15).copied().unwrap_or(0.0);
                (current * Decimal::try_from(1.0 - discount).unwrap_or(Decimal::ONE)).max(floor)
            } else {
                current * Decimal::new(103, 2)
            }
        }
        SellerStrategy::CloseDeal => floor,
        SellerStrategy::GradualConcession => (current - policy.min_step_abs).max(floor),
    }
}

/// Seasonal/competitive adjustment applied strictly after the strategy formula
/// and strictly before floor-clamping (§4.I ADDED).
fn apply_market_context(
    candidate: Decimal,
    floor: Decimal,
    month: Option<u32>,
    competitive: Option<&CompetitiveContext>,
) -> Decimal {
    let seasonal_adjusted = match month {
        Some(month) => {
            let pattern = SeasonalPattern::for_month(month);
            candidate * Decimal::try_from(pattern.price_multiplier).unwrap_or(Decimal::ONE)
        }
        None => candidate,
    };

    match competitive.and_then(|ctx| ctx.price_to_beat()) {
        Some(price_to_beat) => {
            let price_to_beat = Decimal::try_from(price_to_beat).unwrap_or(seasonal_adjusted);
            if price_to_beat < seasonal_adjusted {
                let pressure = competitive.map(|c| c.competitive_pressure).unwrap_or(0.5);
                let max_pull = seasonal_adjusted * Decimal::try_from(pressure * 0.05).unwrap_or(Decimal::ZERO);
                let pull = (seasonal_adjusted - price_to_beat).min(max_pull);
                (seasonal_adjusted - pull).max(floor)
            } else {
                seasonal_adjusted
            }
        }
        None => seasonal_adjusted,
    }
}

/// Output of one seller counter: the offer itself plus the validation context
/// the buyer-agent loop folds into its own move log.
pub struct SellerCounter {
    pub offer: OfferComponents,
    pub strategy: SellerStrategy,
    pub guardrail_alerts: Vec<GuardrailAlert>,
    pub policy_result: PolicyResult,
    pub seller_utility: f64,
}

/// Stateless seller counter-offer generator (§4.I). Holds the same policy and
/// guardrail services the buyer side uses, since both sides are bound by the
/// same rules.
#[derive(Debug, Clone)]
pub struct SellerAgent {
    policy: PolicyEngine,
    guardrail: GuardrailService,
}

impl SellerAgent {
    pub fn new(policy: PolicyEngine, guardrail: GuardrailService) -> Self {
        Self { policy, guardrail }
    }

    pub fn counter(
        &self,
        request: &Request,
        vendor: &VendorProfile,
        buyer_offer: &OfferComponents,
        state: &VendorNegotiationState,
        seasonal_month: Option<u32>,
        competitive: Option<&CompetitiveContext>,
    ) -> SellerCounter {
        let floor = vendor.guardrails.price_floor;
        let list = vendor.list_price(buyer_offer.quantity);
        let current = state
            .last_seller_offer()
            .map(|offer| offer.components.unit_price)
            .unwrap_or(list);

        let strategy = determine_seller_strategy(buyer_offer, vendor, state);
        let strategy_candidate = strategy_price(strategy, current, floor, list, &vendor.exchange_policy, buyer_offer);
        let market_adjusted = apply_market_context(strategy_candidate, floor, seasonal_month, competitive);
        let clamped = market_adjusted.max(floor).round_dp(2);

        let mut offer = buyer_offer.clone();
        offer.unit_price = clamped;

        let notes = enforce_exchange_requirements(buyer_offer, &mut offer, floor, &vendor.exchange_policy);
        offer.notes.extend(notes);

        let mut policy_result = self.policy.validate_offer(request, &offer, Some(vendor), false);
        if !policy_result.valid() {
            offer.unit_price = floor;
            policy_result = self.policy.validate_offer(request, &offer, Some(vendor), false);
        }

        let guardrail_alerts = self.guardrail.evaluate(request, vendor, &offer);
        let seller_utility = compute_seller_utility(offer.unit_price, floor, list, 0.10);

        SellerCounter {
            offer,
            strategy,
            guardrail_alerts,
            policy_result,
            seller_utility,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procur_types::{ExchangePolicy, FsmState, Lever, OpponentModel, PaymentTerms, ReliabilityStats, RiskLevel, VendorGuardrails};
    use std::collections::{BTreeMap, BTreeSet};

    fn exchange_policy() -> ExchangePolicy {
        ExchangePolicy {
            term_trade: BTreeMap::from([(12, 0.05), (24, 0.08)]),
            payment_trade: BTreeMap::from([(PaymentTerms::Net15, -0.02)]),
            value_add_offsets: BTreeMap::new(),
            min_step_abs: Decimal::new(5, 0),
            finalize_gap_abs: Decimal::new(10, 0),
            finalize_gap_pct: 0.02,
            close_extra_discount: 0.01,
            max_rounds: 6,
        }
    }

    fn vendor() -> VendorProfile {
        VendorProfile {
            vendor_id: "vendor-1".to_string(),
            name: "Acme".to_string(),
            category: Some("crm".to_string()),
            capability_tags: BTreeSet::new(),
            certifications: BTreeSet::new(),
            regions: BTreeSet::new(),
            price_tiers: BTreeMap::from([(1, Decimal::new(130, 0))]),
            guardrails: VendorGuardrails {
                price_floor: Decimal::new(90, 0),
                non_negotiables: BTreeSet::new(),
                payment_terms_allowed: BTreeSet::from([PaymentTerms::Net30]),
                response_window_hours: 24,
                contact_endpoints: BTreeSet::new(),
            },
            exchange_policy: exchange_policy(),
            reliability_stats: ReliabilityStats {
                on_time_delivery_pct: Some(0.97),
                support_tier: Some("gold".to_string()),
                sla_pct: Some(0.995),
            },
            risk_level: RiskLevel::Low,
            billing_cadence: None,
        }
    }

    fn buyer_offer(unit_price: i64, term_months: u32, payment_terms: PaymentTerms) -> OfferComponents {
        OfferComponents {
            unit_price: Decimal::new(unit_price, 0),
            currency: "USD".to_string(),
            quantity: 20,
            term_months,
            payment_terms,
            one_time_fees: BTreeMap::new(),
            warranty_support: None,
            exclusions: Vec::new(),
            notes: Vec::new(),
        }
    }

    fn state(round: u32, stalemate_rounds: u32, current_strategy: BuyerStrategy) -> VendorNegotiationState {
        let vendor = vendor();
        VendorNegotiationState {
            vendor: vendor.clone(),
            round,
            best_offer: None,
            active: true,
            concession_index: 0,
            history: Vec::new(),
            opponent_model: OpponentModel::seed(vendor.guardrails.price_floor, Decimal::new(130, 0)),
            stalemate_rounds,
            plan: NegotiationPlan {
                anchors: BTreeMap::new(),
                concession_ladder: vec![Lever::Price, Lever::Term, Lever::Payment, Lever::Value],
                stop_utility: 0.75,
                stop_risk: 0.5,
                allowed_concessions: vec![Lever::Price, Lever::Term, Lever::Payment, Lever::Value],
                current_strategy,
                exchange_policy: exchange_policy(),
            },
            fsm_state: FsmState::Negotiating,
            outcome_reason: None,
            concession_notes: Vec::new(),
            match_summary: procur_types::VendorMatchSummary {
                vendor_id: vendor.vendor_id.clone(),
                inferred_category: "crm".to_string(),
                category_match: true,
                feature: procur_types::FeatureMatch {
                    score: 1.0,
                    matched: Vec::new(),
                    missing: Vec::new(),
                },
                compliance: procur_types::ComplianceAssessment::vacuous(),
                sla_score: 1.0,
                price_fit: 1.0,
                composite_score: 1.0,
            },
            competing_offers: Vec::new(),
        }
    }

    #[test]
    fn below_floor_offers_are_rejected_regardless_of_round() {
        let offer = buyer_offer(80, 12, PaymentTerms::Net30);
        let strategy = determine_seller_strategy(&offer, &vendor(), &state(3, 0, BuyerStrategy::PriceAnchor));
        assert_eq!(strategy, SellerStrategy::RejectBelowFloor);
    }

    #[test]
    fn round_one_anchors_high_even_above_floor() {
        let offer = buyer_offer(100, 12, PaymentTerms::Net30);
        let strategy = determine_seller_strategy(&offer, &vendor(), &state(1, 0, BuyerStrategy::PriceAnchor));
        assert_eq!(strategy, SellerStrategy::AnchorHigh);
    }

    #[test]
    fn repeated_stalemate_forces_a_close() {
        let offer = buyer_offer(100, 12, PaymentTerms::Net30);
        let strategy = determine_seller_strategy(&offer, &vendor(), &state(4, 2, BuyerStrategy::PriceAnchor));
        assert_eq!(strategy, SellerStrategy::CloseDeal);
    }

    #[test]
    fn long_term_trade_from_the_buyer_is_matched_with_term_value() {
        let offer = buyer_offer(100, 24, PaymentTerms::Net30);
        let strategy = determine_seller_strategy(&offer, &vendor(), &state(3, 0, BuyerStrategy::TermTrade));
        assert_eq!(strategy, SellerStrategy::TermValue);
    }

    #[test]
    fn close_deal_strategy_prices_exactly_at_the_floor() {
        let floor = Decimal::new(90, 0);
        let price = strategy_price(SellerStrategy::CloseDeal, Decimal::new(110, 0), floor, Decimal::new(130, 0), &exchange_policy(), &buyer_offer(100, 12, PaymentTerms::Net30));
        assert_eq!(price, floor);
    }

    #[test]
    fn gradual_concession_never_drops_below_the_floor() {
        let floor = Decimal::new(90, 0);
        let policy = exchange_policy();
        let price = strategy_price(SellerStrategy::GradualConcession, floor + Decimal::new(2, 0), floor, Decimal::new(130, 0), &policy, &buyer_offer(100, 12, PaymentTerms::Net30));
        assert_eq!(price, floor);
    }

    #[test]
    fn counter_never_returns_a_price_below_the_vendor_floor() {
        let policy = PolicyEngine::new(procur_policy::PolicyEngineConfig::default());
        let guardrail = GuardrailService::new(procur_policy::GuardrailConfig::default());
        let agent = SellerAgent::new(policy, guardrail);

        let vendor = vendor();
        let request = Request {
            request_id: "req-1".to_string(),
            requester_id: "buyer-1".to_string(),
            request_type: procur_types::RequestType::Saas,
            description: "crm".to_string(),
            specs: BTreeMap::new(),
            quantity: 20,
            budget_min: None,
            budget_max: Some(Decimal::new(2_200, 0)),
            currency: "USD".to_string(),
            must_haves: BTreeSet::new(),
            nice_to_haves: BTreeSet::new(),
            compliance_requirements: BTreeSet::new(),
            billing_cadence: None,
            policy_context: Default::default(),
            status: procur_types::RequestLifecycleState::Active,
        };
        let offer = buyer_offer(70, 12, PaymentTerms::Net30);
        let state = state(1, 0, BuyerStrategy::PriceAnchor);

        let counter = agent.counter(&request, &vendor, &offer, &state, None, None);
        assert!(counter.offer.unit_price >= vendor.guardrails.price_floor);
    }
}
