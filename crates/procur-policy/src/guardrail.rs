use procur_types::{GuardrailAlert, OfferComponents, PaymentTerms, Request, RunMode, VendorProfile};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Tunables for the guardrail service, owned by the caller rather than as
/// module-level constants (§9).
#[derive(Debug, Clone, Copy)]
pub struct GuardrailConfig {
    /// An offer more than this fraction away from list price is flagged as an
    /// outlier worth a human look, though not necessarily blocked.
    pub price_outlier_threshold: f64,
    /// Bank-account verification is only meaningful once real money moves;
    /// skipped entirely in simulation (§4.C).
    pub run_mode: RunMode,
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            price_outlier_threshold: 0.30,
            run_mode: RunMode::Simulation,
        }
    }
}

/// Runs the checks a human reviewer would want before a deal closes: is this
/// vendor who it claims to be, is the price sane, is the payment schedule safe
/// (§4.C).
#[derive(Debug, Clone)]
pub struct GuardrailService {
    config: GuardrailConfig,
}

impl GuardrailService {
    pub fn new(config: GuardrailConfig) -> Self {
        Self { config }
    }

    /// Flags counterparties the host has not verified a contact channel for.
    /// Skipped in simulation mode, where no funds actually move (§4.C).
    pub fn verify_counterparty(&self, vendor: &VendorProfile) -> Vec<GuardrailAlert> {
        let mut alerts = Vec::new();
        if self.config.run_mode == RunMode::Production
            && !vendor.guardrails.contact_endpoints.contains("bank_account")
        {
            alerts.push(GuardrailAlert::non_blocking(
                "missing_bank_verification",
                format!("{} has no verified bank_account endpoint on file", vendor.name),
            ));
        }
        alerts
    }

    /// Flags an offer whose unit price deviates from the vendor's list price by
    /// more than `price_outlier_threshold`. Non-blocking: outliers in the buyer's
    /// favor are a good outcome, so this only informs review, never halts it.
    pub fn check_price_outlier(&self, vendor: &VendorProfile, offer: &OfferComponents) -> Option<GuardrailAlert> {
        let list = vendor.list_price(offer.quantity);
        if list.is_zero() {
            return None;
        }
        let deviation = ((offer.unit_price - list) / list).abs().to_f64().unwrap_or(0.0);
        if deviation > self.config.price_outlier_threshold {
            Some(GuardrailAlert::non_blocking(
                "price_outlier",
                format!(
                    "unit_price {} deviates {:.0}% from list price {list}",
                    offer.unit_price,
                    deviation * 100.0
                ),
            ))
        } else {
            None
        }
    }

    /// Deposit payment terms require a documented deposit policy on the vendor's
    /// verified endpoints; absent that, the deal cannot proceed on those terms.
    pub fn check_deposit_policy(&self, vendor: &VendorProfile, payment_terms: PaymentTerms) -> Option<GuardrailAlert> {
        if payment_terms == PaymentTerms::Deposit
            && !vendor.guardrails.contact_endpoints.contains("deposit_policy")
        {
            Some(GuardrailAlert::blocking(
                "undocumented_deposit_policy",
                format!("{} has no documented deposit policy", vendor.name),
            ))
        } else {
            None
        }
    }

    /// Runs every check against a candidate offer and returns the union of alerts.
    pub fn evaluate(
        &self,
        _request: &Request,
        vendor: &VendorProfile,
        offer: &OfferComponents,
    ) -> Vec<GuardrailAlert> {
        let mut alerts = self.verify_counterparty(vendor);
        alerts.extend(self.check_price_outlier(vendor, offer));
        alerts.extend(self.check_deposit_policy(vendor, offer.payment_terms));
        alerts
    }
}
