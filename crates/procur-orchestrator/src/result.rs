use std::collections::HashMap;

use procur_types::{
    AuditEvent, ClarificationQuestion, ComplianceFinding, NegotiationMemory, NegotiationOutcome, PaymentTerms, Request,
    RoundLog,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One shortlisted vendor, as surfaced before any negotiation runs (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortlistEntry {
    pub vendor_id: String,
    pub name: String,
    pub score: f64,
    pub reasons: Vec<String>,
}

/// One of the three presentation bundles; `None` when no vendor produced a
/// usable final offer (every shortlisted vendor timed out, was cancelled, or
/// hit `no_zopa`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleOffer {
    pub offer_id: String,
    pub vendor_id: String,
    pub bullets: Vec<String>,
}

/// §4.L step 5: `best_value` = highest utility, `lowest_cost` = lowest unit
/// price, `lowest_risk` = lowest risk score, deduplicated by vendor so the
/// same vendor never fills more than one slot unless no other vendor
/// qualifies for the remaining slots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresentationBundles {
    pub best_value: Option<BundleOffer>,
    pub lowest_cost: Option<BundleOffer>,
    pub lowest_risk: Option<BundleOffer>,
}

/// Vendor reliability facts surfaced alongside a final offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportSummary {
    pub support_tier: Option<String>,
    pub sla_pct: Option<f64>,
    pub response_window_hours: u32,
}

/// Per-vendor negotiation outcome, summarized for presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSummary {
    pub rounds: u32,
    pub outcome: NegotiationOutcome,
    pub outcome_reason: Option<String>,
    pub savings: Decimal,
}

/// One finalized vendor's full result, carrying everything the host needs to
/// render or act on the deal (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorResult {
    pub vendor_id: String,
    pub vendor_name: String,
    pub final_price: Decimal,
    pub term_months: u32,
    pub payment_terms: PaymentTerms,
    pub compliance_status: Vec<ComplianceFinding>,
    pub support: SupportSummary,
    pub behavior_profile: String,
    pub audit_summary: AuditSummary,
    pub memory_log: Option<NegotiationMemory>,
}

/// Exported audit data for the whole run: every vendor's round log plus the
/// request-level event stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditExport {
    pub round_logs: HashMap<String, RoundLog>,
    pub events: Vec<AuditEvent>,
}

/// `Pipeline::run`'s return value (§4.L, §6). `request` and `clarification_questions`
/// are mutually informative: a clarification-needed run carries no `request`
/// (intake never produced one) and every other field stays empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineResult {
    pub request: Option<Request>,
    #[serde(default)]
    pub clarification_questions: Vec<ClarificationQuestion>,
    #[serde(default)]
    pub shortlist: Vec<ShortlistEntry>,
    #[serde(default)]
    pub bundles: PresentationBundles,
    #[serde(default)]
    pub vendors: Vec<VendorResult>,
    #[serde(default)]
    pub audit: AuditExport,
}

impl PipelineResult {
    /// Intake could not produce a complete `Request`; the caller must resupply
    /// answers and re-run (§4.L step 1).
    pub fn needs_clarification(questions: Vec<ClarificationQuestion>) -> Self {
        Self {
            clarification_questions: questions,
            ..Self::default()
        }
    }
}
