use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ActorRole, NextStepHint, PaymentTerms};

/// The negotiable terms of an offer; everything a buyer or seller can trade.
///
/// Invariant (enforced on the seller path): `unit_price ≥ vendor.guardrails.price_floor`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferComponents {
    pub unit_price: Decimal,
    pub currency: String,
    pub quantity: u32,
    pub term_months: u32,
    pub payment_terms: PaymentTerms,
    /// Positive entries are fees, negative are credits (§4.A TCO).
    #[serde(default)]
    pub one_time_fees: BTreeMap<String, Decimal>,
    pub warranty_support: Option<String>,
    #[serde(default)]
    pub exclusions: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

/// Output of the evaluation kernel (§4.A) for a single `OfferComponents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferScore {
    pub spec_match: f64,
    pub tco_norm: f64,
    pub risk: f64,
    pub time: f64,
    pub utility: f64,
    #[serde(default)]
    pub matched_features: Vec<String>,
    #[serde(default)]
    pub missing_features: Vec<String>,
}

/// An offer as it existed at a point in the negotiation; append-only per round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub offer_id: String,
    pub request_id: String,
    pub vendor_id: String,
    pub components: OfferComponents,
    pub score: Option<OfferScore>,
    pub confidence: Option<f64>,
    pub accepted: bool,
}

/// Machine-readable justification for a proposal, consumed by the audit trail and
/// surfaced in `PipelineResult` bundles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineRationale {
    #[serde(default)]
    pub score_components: BTreeMap<String, f64>,
    #[serde(default)]
    pub constraints_respected: Vec<String>,
    pub concession_taken: Option<String>,
}

/// Wire schema produced by a `ProposalGenerator` implementation (§4.M, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NegotiationMessage {
    pub actor: ActorRole,
    pub round: u32,
    pub proposal: OfferComponents,
    #[serde(default)]
    pub justification_bullets: Vec<String>,
    pub machine_rationale: MachineRationale,
    pub next_step_hint: NextStepHint,
}
