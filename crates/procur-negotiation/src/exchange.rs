use procur_types::{ExchangePolicy, OfferComponents};
use rust_decimal::Decimal;

fn present_value_discount(previous_price: Decimal, day_delta: i64) -> Decimal {
    if day_delta <= 0 {
        return Decimal::ZERO;
    }
    let compounded = (1.0 + 0.12_f64 / 365.0).powi(day_delta as i32);
    let discount_factor = 1.0 - 1.0 / compounded;
    previous_price * Decimal::try_from(discount_factor).unwrap_or(Decimal::ZERO)
}

/// §4.G `enforce_exchange_requirements`: whichever side moved `current` away
/// from `previous`, the corresponding economic trade must actually be
/// reflected in price — term extensions earn their discount, faster payment
/// earns at least its present-value discount, slower payment's premium is
/// capped. Mutates `current` in place and returns the notes an auditor would
/// want attached to the move.
pub fn enforce_exchange_requirements(
    previous: &OfferComponents,
    current: &mut OfferComponents,
    floor_price: Decimal,
    policy: &ExchangePolicy,
) -> Vec<String> {
    let mut notes = Vec::new();

    if current.term_months > previous.term_months {
        let added_months = current.term_months - previous.term_months;
        let required_discount = policy.term_discount_for(added_months);
        let max_allowed_price =
            previous.unit_price * Decimal::try_from(1.0 - required_discount).unwrap_or(Decimal::ONE);
        if current.unit_price > max_allowed_price {
            current.unit_price = max_allowed_price.max(floor_price);
            notes.push(format!(
                "adjusted price to reflect {added_months}-month term extension discount"
            ));
        }
    }

    let previous_discount = policy.payment_trade.get(&previous.payment_terms).copied().unwrap_or(0.0);
    let current_discount = policy.payment_trade.get(&current.payment_terms).copied().unwrap_or(0.0);

    if current_discount > previous_discount {
        let delta_offset =
            previous.unit_price * Decimal::try_from(current_discount - previous_discount).unwrap_or(Decimal::ZERO);
        let day_delta = previous.payment_terms.net_days().unwrap_or(30) - current.payment_terms.net_days().unwrap_or(30);
        let pv_discount = present_value_discount(previous.unit_price, day_delta);
        let required = delta_offset.max(pv_discount);
        let max_allowed_price = previous.unit_price - required;
        if current.unit_price > max_allowed_price {
            current.unit_price = max_allowed_price.max(floor_price);
            notes.push("applied faster-payment discount".to_string());
        }
    } else if current_discount < previous_discount {
        let capped_premium =
            previous.unit_price * Decimal::try_from(previous_discount - current_discount).unwrap_or(Decimal::ZERO);
        let max_allowed_price = previous.unit_price + capped_premium;
        if current.unit_price > max_allowed_price {
            current.unit_price = max_allowed_price;
            notes.push("capped slower-payment premium".to_string());
        }
    }

    current.unit_price = current.unit_price.max(floor_price).round_dp(2);
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use procur_types::PaymentTerms;
    use std::collections::BTreeMap;

    fn policy() -> ExchangePolicy {
        ExchangePolicy {
            term_trade: BTreeMap::from([(12, 0.05)]),
            payment_trade: BTreeMap::from([(PaymentTerms::Net15, 0.03), (PaymentTerms::Net45, -0.02)]),
            value_add_offsets: BTreeMap::new(),
            min_step_abs: Decimal::new(1, 2),
            finalize_gap_abs: Decimal::new(10, 0),
            finalize_gap_pct: 0.02,
            close_extra_discount: 0.01,
            max_rounds: 8,
        }
    }

    fn offer(price: i64, term_months: u32, payment_terms: PaymentTerms) -> OfferComponents {
        OfferComponents {
            unit_price: Decimal::new(price, 0),
            currency: "USD".into(),
            quantity: 10,
            term_months,
            payment_terms,
            one_time_fees: BTreeMap::new(),
            warranty_support: None,
            exclusions: Vec::new(),
            notes: Vec::new(),
        }
    }

    #[test]
    fn term_extension_without_discount_gets_adjusted() {
        let previous = offer(1000, 12, PaymentTerms::Net30);
        let mut current = offer(1000, 24, PaymentTerms::Net30);
        let notes = enforce_exchange_requirements(&previous, &mut current, Decimal::new(800, 0), &policy());
        assert!(current.unit_price < Decimal::new(1000, 0));
        assert!(!notes.is_empty());
    }

    #[test]
    fn slower_payment_premium_is_capped() {
        let previous = offer(1000, 12, PaymentTerms::Net15);
        let mut current = offer(1100, 12, PaymentTerms::Net45);
        enforce_exchange_requirements(&previous, &mut current, Decimal::new(800, 0), &policy());
        // premium capped at prev * (0.03 - (-0.02)) = 1000 * 0.05 = 50
        assert!(current.unit_price <= Decimal::new(1050, 0));
    }

    #[test]
    fn final_price_never_drops_below_floor() {
        let previous = offer(1000, 12, PaymentTerms::Net30);
        let mut current = offer(1000, 24, PaymentTerms::Net30);
        enforce_exchange_requirements(&previous, &mut current, Decimal::new(990, 0), &policy());
        assert!(current.unit_price >= Decimal::new(990, 0));
    }
}
