use std::collections::BTreeMap;

use procur_evaluation::tco::compute_tco;
use procur_types::{BuyerStrategy, ExchangePolicy, OfferComponents, PaymentTerms};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

fn base_components(unit_price: Decimal, quantity: u32, term_months: u32, payment_terms: PaymentTerms) -> OfferComponents {
    OfferComponents {
        unit_price,
        currency: "USD".to_string(),
        quantity,
        term_months,
        payment_terms,
        one_time_fees: BTreeMap::new(),
        warranty_support: None,
        exclusions: Vec::new(),
        notes: Vec::new(),
    }
}

fn price_anchor_price(list_price: Decimal, floor_price: Decimal, budget_pu: Decimal) -> Decimal {
    let overrun = if list_price > Decimal::ZERO {
        ((list_price - budget_pu) / list_price).to_f64().unwrap_or(0.05)
    } else {
        0.05
    };
    let drop = overrun.max(0.05).min(0.15);
    let candidate = list_price * Decimal::try_from(1.0 - drop).unwrap_or(Decimal::ONE);
    candidate.max(floor_price)
}

/// §4.G seed bundles A–D, produced at round 1 and after `replan_required`.
/// Bundles whose TCO exceeds `budget_max·1.1` are dropped; if that empties the
/// set, the single minimum-TCO bundle survives as a deadman switch.
pub fn generate_seed_bundles(
    list_price: Decimal,
    floor_price: Decimal,
    budget_pu: Decimal,
    budget_max: Option<Decimal>,
    quantity: u32,
    policy: &ExchangePolicy,
) -> Vec<OfferComponents> {
    let mut bundles = Vec::new();

    // A) price anchor, 12 months, Net30.
    bundles.push(base_components(
        price_anchor_price(list_price, floor_price, budget_pu),
        quantity,
        12,
        PaymentTerms::Net30,
    ));

    // B) term trade at 24 months, discount taken from the 12-month rate.
    let term_discount = policy.term_trade.get(&12).copied().unwrap_or(0.0);
    bundles.push(base_components(
        (list_price * Decimal::try_from(1.0 - term_discount).unwrap_or(Decimal::ONE)).max(floor_price),
        quantity,
        24,
        PaymentTerms::Net30,
    ));

    // C) payment trade, Net15.
    let payment_discount = policy.payment_trade.get(&PaymentTerms::Net15).copied().unwrap_or(0.0);
    bundles.push(base_components(
        (list_price * Decimal::try_from(1.0 - payment_discount).unwrap_or(Decimal::ONE)).max(floor_price),
        quantity,
        12,
        PaymentTerms::Net15,
    ));

    // D) value-add bundle, only when the buyer is meaningfully under list price.
    if budget_pu < list_price * Decimal::new(9, 1) {
        let mut components = base_components(list_price, quantity, 12, PaymentTerms::Net30);
        for (label, credit) in &policy.value_add_offsets {
            components.notes.push(format!("value_add:{label}"));
            components.one_time_fees.insert(format!("value_add_{label}"), -*credit);
        }
        bundles.push(components);
    }

    let budget_cap = budget_max.map(|max| max * Decimal::new(11, 1) / Decimal::from(10));
    let scored: Vec<(OfferComponents, Decimal)> = bundles
        .into_iter()
        .filter_map(|components| {
            compute_tco(&components, None)
                .ok()
                .map(|breakdown| (components, breakdown.total))
        })
        .collect();

    let passing: Vec<OfferComponents> = scored
        .iter()
        .filter(|(_, tco)| budget_cap.map(|cap| *tco <= cap).unwrap_or(true))
        .map(|(components, _)| components.clone())
        .collect();

    if !passing.is_empty() {
        return passing;
    }

    scored
        .into_iter()
        .min_by(|a, b| a.1.cmp(&b.1))
        .map(|(components, _)| vec![components])
        .unwrap_or_default()
}

/// §4.G target bundle generation: one bundle per selected strategy, using the
/// same pricing algebra as the seed bundles, with per-strategy minimums.
/// Advanced discounts (volume, seasonal) are the caller's responsibility to
/// layer on afterward — this produces the strategy's base candidate.
pub fn generate_target_bundle(
    strategy: BuyerStrategy,
    list_price: Decimal,
    floor_price: Decimal,
    budget_pu: Decimal,
    quantity: u32,
    current_term_months: u32,
    opponent_floor_estimate: Decimal,
    policy: &ExchangePolicy,
) -> OfferComponents {
    match strategy {
        BuyerStrategy::PriceAnchor => {
            let candidate = price_anchor_price(list_price, floor_price, budget_pu);
            let floored = candidate.min(list_price * Decimal::new(85, 2));
            base_components(floored.max(floor_price), quantity, 12, PaymentTerms::Net30)
        }
        BuyerStrategy::TermTrade => {
            let months = (current_term_months + 12).max(24);
            let discount = policy.term_discount_for(months - 12);
            base_components(
                (list_price * Decimal::try_from(1.0 - discount).unwrap_or(Decimal::ONE)).max(floor_price),
                quantity,
                months,
                PaymentTerms::Net30,
            )
        }
        BuyerStrategy::PaymentTrade => {
            let discount = policy.payment_trade.get(&PaymentTerms::Net15).copied().unwrap_or(0.0);
            base_components(
                (list_price * Decimal::try_from(1.0 - discount).unwrap_or(Decimal::ONE)).max(floor_price),
                quantity,
                current_term_months,
                PaymentTerms::Net15,
            )
        }
        BuyerStrategy::ValueAdd => {
            let mut components = base_components(list_price, quantity, current_term_months, PaymentTerms::Net30);
            for (label, credit) in &policy.value_add_offsets {
                components.one_time_fees.insert(format!("value_add_{label}"), -*credit);
            }
            components
        }
        BuyerStrategy::Ultimatum => {
            let target = (opponent_floor_estimate + Decimal::from(25)).max(floor_price);
            base_components(target, quantity, current_term_months, PaymentTerms::Net30)
        }
        BuyerStrategy::PricePressure => {
            let candidate = (list_price * Decimal::new(9, 1)).max(floor_price);
            base_components(candidate, quantity, current_term_months, PaymentTerms::Net30)
        }
    }
}

/// §4.G offer-diversity enforcement: a bundle within $5/0 months of the last
/// counterparty offer is pushed at least $15 lower.
pub fn enforce_offer_diversity(candidate: &mut OfferComponents, last_counterparty_offer: Option<&OfferComponents>, floor_price: Decimal) {
    if let Some(previous) = last_counterparty_offer {
        let price_delta = (candidate.unit_price - previous.unit_price).abs();
        let term_delta = candidate.term_months as i64 - previous.term_months as i64;
        if price_delta < Decimal::from(5) && term_delta == 0 {
            candidate.unit_price = (candidate.unit_price - Decimal::from(15)).max(floor_price);
        }
    }
}

/// §4.G monotonic-progress enforcement: the buyer's own price must not regress
/// across its last two offers (it may only hold or move toward the seller).
pub fn enforce_monotonic_progress(candidate: &mut OfferComponents, previous_own_offer: Option<&OfferComponents>) {
    if let Some(previous) = previous_own_offer {
        if candidate.unit_price > previous.unit_price {
            candidate.unit_price = previous.unit_price;
        }
    }
}
