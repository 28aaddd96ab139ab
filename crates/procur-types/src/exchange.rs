use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::PaymentTerms;

/// Vendor-scoped deterministic rates that convert term/payment/value-add levers into
/// price discounts (§3, §4.F, §4.G).
///
/// Invariants: `term_trade` keys are positive month deltas; `payment_trade` percentages
/// lie in `(-0.25, 0.25)`; `min_step_abs > 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangePolicy {
    /// Added months → discount fraction (e.g. `{12: 0.05, 24: 0.08}`).
    #[serde(default)]
    pub term_trade: BTreeMap<u32, f64>,
    /// Payment terms → discount fraction; negative values are premiums for slower terms.
    #[serde(default)]
    pub payment_trade: BTreeMap<PaymentTerms, f64>,
    /// Per-seat dollar credit keyed by a human label (e.g. "onboarding", "training").
    #[serde(default)]
    pub value_add_offsets: BTreeMap<String, Decimal>,
    pub min_step_abs: Decimal,
    pub finalize_gap_abs: Decimal,
    pub finalize_gap_pct: f64,
    pub close_extra_discount: f64,
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
}

fn default_max_rounds() -> u32 {
    8
}

#[derive(Debug, thiserror::Error)]
pub enum ExchangePolicyError {
    #[error("term_trade key {months} must be a positive month count")]
    NonPositiveTermKey { months: u32 },
    #[error("payment_trade discount {discount} for {terms:?} must lie in (-0.25, 0.25)")]
    PaymentDiscountOutOfRange { terms: PaymentTerms, discount: f64 },
    #[error("min_step_abs must be positive, got {value}")]
    NonPositiveMinStep { value: Decimal },
}

impl ExchangePolicy {
    pub fn validate(&self) -> Result<(), ExchangePolicyError> {
        for &months in self.term_trade.keys() {
            if months == 0 {
                return Err(ExchangePolicyError::NonPositiveTermKey { months });
            }
        }
        for (&terms, &discount) in &self.payment_trade {
            if !(-0.25..0.25).contains(&discount) {
                return Err(ExchangePolicyError::PaymentDiscountOutOfRange { terms, discount });
            }
        }
        if self.min_step_abs <= Decimal::ZERO {
            return Err(ExchangePolicyError::NonPositiveMinStep {
                value: self.min_step_abs,
            });
        }
        Ok(())
    }

    /// Discount implied by extending the term by `added_months`: an exact lookup if
    /// the vendor declared that key, else proportional to the 12-month rate (§4.G).
    pub fn term_discount_for(&self, added_months: u32) -> f64 {
        if let Some(&rate) = self.term_trade.get(&added_months) {
            return rate;
        }
        let base = self.term_trade.get(&12).copied().unwrap_or(0.0);
        base * (added_months as f64 / 12.0)
    }
}
