use std::collections::BTreeSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use procur_types::{ExchangePolicy, Lever, PaymentTerms};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// One concrete combination of levers the concession engine can offer (§4.F).
#[derive(Debug, Clone, Default)]
pub struct LeverOption {
    pub levers: Vec<Lever>,
    pub payment_terms: Option<PaymentTerms>,
    pub added_term_months: Option<u32>,
    pub value_add_keys: Vec<String>,
}

/// The cheapest-for-seller combination that still clears `floor_price`.
#[derive(Debug, Clone)]
pub struct BestCombination {
    pub option: LeverOption,
    pub price: Decimal,
}

fn value_add_credit(policy: &ExchangePolicy, keys: &[String], seats: u32) -> Decimal {
    keys.iter()
        .filter_map(|key| policy.value_add_offsets.get(key))
        .map(|per_seat| *per_seat * Decimal::from(seats.max(1)))
        .sum()
}

/// `effective_price = list · Π(1 − discount_i) − per_seat_credit` (§4.F).
pub fn effective_price(list_price: Decimal, policy: &ExchangePolicy, option: &LeverOption, seats: u32) -> Decimal {
    let mut multiplier = 1.0_f64;
    if let Some(terms) = option.payment_terms {
        multiplier *= 1.0 - policy.payment_trade.get(&terms).copied().unwrap_or(0.0);
    }
    if let Some(months) = option.added_term_months {
        multiplier *= 1.0 - policy.term_discount_for(months);
    }
    let discounted = list_price * Decimal::try_from(multiplier).unwrap_or(Decimal::ONE);
    discounted - value_add_credit(policy, &option.value_add_keys, seats)
}

fn payment_options(policy: &ExchangePolicy) -> Vec<(PaymentTerms, f64)> {
    let mut options: Vec<(PaymentTerms, f64)> = policy.payment_trade.iter().map(|(t, d)| (*t, *d)).collect();
    options.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    options
}

fn term_options(policy: &ExchangePolicy) -> Vec<(u32, f64)> {
    let mut options: Vec<(u32, f64)> = policy.term_trade.iter().map(|(m, d)| (*m, *d)).collect();
    options.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    options
}

fn value_add_options(policy: &ExchangePolicy) -> Vec<String> {
    policy.value_add_offsets.keys().cloned().collect()
}

/// Enumerates the combinations named in §4.F: singles, payment×term and
/// lever+value-add pairs, and a capped triple (top-2 payment × top-2 term −
/// value-add).
pub fn enumerate_lever_combinations(policy: &ExchangePolicy) -> Vec<LeverOption> {
    let payments = payment_options(policy);
    let terms = term_options(policy);
    let value_adds = value_add_options(policy);
    let mut combos = Vec::new();

    for (terms_value, _) in &payments {
        combos.push(LeverOption {
            levers: vec![Lever::Payment],
            payment_terms: Some(*terms_value),
            ..Default::default()
        });
    }
    for (months, _) in &terms {
        combos.push(LeverOption {
            levers: vec![Lever::Term],
            added_term_months: Some(*months),
            ..Default::default()
        });
    }
    for key in &value_adds {
        combos.push(LeverOption {
            levers: vec![Lever::Value],
            value_add_keys: vec![key.clone()],
            ..Default::default()
        });
    }

    for (pt, _) in &payments {
        for (months, _) in &terms {
            combos.push(LeverOption {
                levers: vec![Lever::Payment, Lever::Term],
                payment_terms: Some(*pt),
                added_term_months: Some(*months),
                ..Default::default()
            });
        }
        for key in &value_adds {
            combos.push(LeverOption {
                levers: vec![Lever::Payment, Lever::Value],
                payment_terms: Some(*pt),
                value_add_keys: vec![key.clone()],
                ..Default::default()
            });
        }
    }
    for (months, _) in &terms {
        for key in &value_adds {
            combos.push(LeverOption {
                levers: vec![Lever::Term, Lever::Value],
                added_term_months: Some(*months),
                value_add_keys: vec![key.clone()],
                ..Default::default()
            });
        }
    }

    let top_payments: Vec<_> = payments.iter().take(2).collect();
    let top_terms: Vec<_> = terms.iter().take(2).collect();
    for (pt, _) in &top_payments {
        for (months, _) in &top_terms {
            for key in &value_adds {
                combos.push(LeverOption {
                    levers: vec![Lever::Payment, Lever::Term, Lever::Value],
                    payment_terms: Some(*pt),
                    added_term_months: Some(*months),
                    value_add_keys: vec![key.clone()],
                    ..Default::default()
                });
            }
        }
    }

    combos
}

/// Cheapest combination (for the seller) that still clears `floor_price`, or
/// `None` if every combination undercuts the floor (§4.F).
pub fn feasible_with_trades(
    list_price: Decimal,
    floor_price: Decimal,
    seats: u32,
    policy: &ExchangePolicy,
) -> Option<BestCombination> {
    enumerate_lever_combinations(policy)
        .into_iter()
        .map(|option| {
            let price = effective_price(list_price, policy, &option, seats);
            (option, price)
        })
        .filter(|(_, price)| *price >= floor_price)
        .min_by(|a, b| a.1.cmp(&b.1))
        .map(|(option, price)| BestCombination { option, price })
}

fn deterministic_unit_interval(parts: &[&str]) -> f64 {
    let mut hasher = DefaultHasher::new();
    for part in parts {
        part.hash(&mut hasher);
    }
    (hasher.finish() % 1_000_000) as f64 / 1_000_000.0
}

/// Yield (list − effective price) for the best single-lever combo in each
/// category the concession ladder hasn't exhausted yet, plus a synthetic
/// `Price` lever representing a plain `min_step_abs` concession.
fn single_lever_yields(
    list_price: Decimal,
    seats: u32,
    policy: &ExchangePolicy,
    excluded: &BTreeSet<Lever>,
) -> Vec<(Lever, Decimal)> {
    let mut yields = Vec::new();

    if !excluded.contains(&Lever::Price) {
        yields.push((Lever::Price, policy.min_step_abs));
    }
    if !excluded.contains(&Lever::Payment) {
        if let Some((pt, _)) = payment_options(policy).into_iter().next() {
            let option = LeverOption {
                levers: vec![Lever::Payment],
                payment_terms: Some(pt),
                ..Default::default()
            };
            let price = effective_price(list_price, policy, &option, seats);
            yields.push((Lever::Payment, list_price - price));
        }
    }
    if !excluded.contains(&Lever::Term) {
        if let Some((months, _)) = term_options(policy).into_iter().next() {
            let option = LeverOption {
                levers: vec![Lever::Term],
                added_term_months: Some(months),
                ..Default::default()
            };
            let price = effective_price(list_price, policy, &option, seats);
            yields.push((Lever::Term, list_price - price));
        }
    }
    if !excluded.contains(&Lever::Value) {
        if let Some(key) = value_add_options(policy).into_iter().next() {
            let option = LeverOption {
                levers: vec![Lever::Value],
                value_add_keys: vec![key],
                ..Default::default()
            };
            let price = effective_price(list_price, policy, &option, seats);
            yields.push((Lever::Value, list_price - price));
        }
    }

    yields
}

/// Best untried lever by effective-price yield, chosen with probability
/// `1 − epsilon`; otherwise a uniform pick among the remaining levers (§4.G
/// ADDED best-lever selection). The explore/exploit coin flip and the uniform
/// fallback are both derived deterministically from `(request_id, vendor_id,
/// round)` so the same negotiation always makes the same choice.
pub fn choose_lever_epsilon_greedy(
    request_id: &str,
    vendor_id: &str,
    round: u32,
    list_price: Decimal,
    seats: u32,
    policy: &ExchangePolicy,
    excluded: &BTreeSet<Lever>,
    epsilon: f64,
) -> Option<Lever> {
    let yields = single_lever_yields(list_price, seats, policy, excluded);
    if yields.is_empty() {
        return None;
    }

    let round_str = round.to_string();
    let explore_roll = deterministic_unit_interval(&[request_id, vendor_id, &round_str, "explore"]);

    if explore_roll >= epsilon {
        yields
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1))
            .map(|(lever, _)| lever)
    } else {
        let pick_roll = deterministic_unit_interval(&[request_id, vendor_id, &round_str, "uniform"]);
        let index = ((pick_roll * yields.len() as f64) as usize).min(yields.len() - 1);
        Some(yields[index].0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn policy() -> ExchangePolicy {
        ExchangePolicy {
            term_trade: BTreeMap::from([(12, 0.05), (24, 0.08)]),
            payment_trade: BTreeMap::from([(PaymentTerms::Net15, 0.03), (PaymentTerms::Net45, -0.02)]),
            value_add_offsets: BTreeMap::from([("onboarding".to_string(), Decimal::new(5, 0))]),
            min_step_abs: Decimal::new(1, 2),
            finalize_gap_abs: Decimal::new(10, 0),
            finalize_gap_pct: 0.02,
            close_extra_discount: 0.01,
            max_rounds: 8,
        }
    }

    #[test]
    fn feasible_combination_respects_floor() {
        let best = feasible_with_trades(Decimal::new(1000, 0), Decimal::new(850, 0), 10, &policy()).unwrap();
        assert!(best.price >= Decimal::new(850, 0));
    }

    #[test]
    fn impossible_floor_yields_none() {
        let best = feasible_with_trades(Decimal::new(1000, 0), Decimal::new(2000, 0), 10, &policy());
        assert!(best.is_none());
    }

    #[test]
    fn epsilon_greedy_is_reproducible_for_same_inputs() {
        let excluded = BTreeSet::new();
        let first = choose_lever_epsilon_greedy("req-1", "vendor-1", 2, Decimal::new(1000, 0), 10, &policy(), &excluded, 0.1);
        let second = choose_lever_epsilon_greedy("req-1", "vendor-1", 2, Decimal::new(1000, 0), 10, &policy(), &excluded, 0.1);
        assert_eq!(first, second);
    }

    #[test]
    fn exhausted_ladder_yields_none() {
        let excluded = BTreeSet::from([Lever::Price, Lever::Payment, Lever::Term, Lever::Value]);
        assert!(choose_lever_epsilon_greedy("req-1", "vendor-1", 2, Decimal::new(1000, 0), 10, &policy(), &excluded, 0.1).is_none());
    }
}
