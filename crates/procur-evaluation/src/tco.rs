use procur_types::{OfferComponents, PaymentTerms};
use rust_decimal::Decimal;

use crate::{round2, EvaluationError};

/// Breakdown of a TCO computation, kept around for audit rationale and for the
/// `TCO-Rounding` invariant check (§8).
#[derive(Debug, Clone, Copy)]
pub struct TcoBreakdown {
    pub base: Decimal,
    pub fees: Decimal,
    pub credits: Decimal,
    pub prepay_adj: Decimal,
    pub total: Decimal,
}

/// Computes total cost of ownership for `components` over its own `term_months`.
///
/// `base = round2(unit_price × quantity × term_months / 12)`; `fees`/`credits` come
/// from the signed `one_time_fees` map (positive = fee, negative = credit); a
/// `Deposit` payment term applies `prepay_rate` as a negative adjustment on `base`.
/// Verifies the `|recomputed - total| ≤ 0.01` invariant before returning, raising
/// `RoundingDrift` on violation (§4.A, §8 TCO-Rounding).
pub fn compute_tco(
    components: &OfferComponents,
    prepay_rate: Option<Decimal>,
) -> Result<TcoBreakdown, EvaluationError> {
    let base = round2(
        components.unit_price * Decimal::from(components.quantity) * Decimal::from(components.term_months)
            / Decimal::from(12),
    );

    let mut fees = Decimal::ZERO;
    let mut credits = Decimal::ZERO;
    for amount in components.one_time_fees.values() {
        if *amount > Decimal::ZERO {
            fees += *amount;
        } else {
            credits += -*amount;
        }
    }

    let prepay_adj = if components.payment_terms == PaymentTerms::Deposit {
        let rate = prepay_rate.unwrap_or(Decimal::ZERO);
        -round2(base * rate)
    } else {
        Decimal::ZERO
    };

    let total = round2(base + fees - credits + prepay_adj);
    let recomputed = base + fees - credits + prepay_adj;
    let drift = (recomputed - total).abs();
    if drift > Decimal::new(1, 2) {
        return Err(EvaluationError::RoundingDrift {
            base,
            total,
            drift,
        });
    }

    Ok(TcoBreakdown {
        base,
        fees,
        credits,
        prepay_adj,
        total,
    })
}
