use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ExchangePolicy, PaymentTerms, RiskLevel};

/// Vendor-declared floors and hard limits; never relaxed by negotiation logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorGuardrails {
    pub price_floor: Decimal,
    #[serde(default)]
    pub non_negotiables: BTreeSet<String>,
    pub payment_terms_allowed: BTreeSet<PaymentTerms>,
    #[serde(default = "default_response_window_hours")]
    pub response_window_hours: u32,
    /// Endpoints the host has verified for this vendor (e.g. `bank_account`,
    /// `deposit_policy`); consumed by the guardrail service (§4.C).
    #[serde(default)]
    pub contact_endpoints: BTreeSet<String>,
}

fn default_response_window_hours() -> u32 {
    24
}

/// Rolling reliability signal a vendor brings into a run; informs risk scoring only.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReliabilityStats {
    pub on_time_delivery_pct: Option<f64>,
    pub support_tier: Option<String>,
    pub sla_pct: Option<f64>,
}

/// Read-only within a run; shared across every vendor's negotiation worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorProfile {
    pub vendor_id: String,
    pub name: String,
    pub category: Option<String>,
    #[serde(default)]
    pub capability_tags: BTreeSet<String>,
    #[serde(default)]
    pub certifications: BTreeSet<String>,
    #[serde(default)]
    pub regions: BTreeSet<String>,
    /// Quantity-tiered list price (e.g. `{1: 1500, 50: 1300, 100: 1200}`); `list_price`
    /// picks the richest tier not exceeding the requested quantity.
    #[serde(default)]
    pub price_tiers: BTreeMap<u32, Decimal>,
    pub guardrails: VendorGuardrails,
    pub exchange_policy: ExchangePolicy,
    #[serde(default)]
    pub reliability_stats: ReliabilityStats,
    pub risk_level: RiskLevel,
    pub billing_cadence: Option<String>,
}

impl VendorProfile {
    /// List price applicable at `quantity`, i.e. the highest tier key ≤ `quantity`,
    /// falling back to the lowest tier if `quantity` undercuts every key.
    pub fn list_price(&self, quantity: u32) -> Decimal {
        self.price_tiers
            .range(..=quantity)
            .next_back()
            .map(|(_, price)| *price)
            .or_else(|| self.price_tiers.values().next().copied())
            .unwrap_or(self.guardrails.price_floor)
    }
}
