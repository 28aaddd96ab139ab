use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ActorRole, GuardrailAlert, Lever, NegotiationDecision, NegotiationOutcome, Offer, PolicyViolation};

/// One candidate bundle considered during a round, whether or not it was chosen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateEvaluation {
    pub offer: Offer,
    pub primary_lever: Lever,
    pub tco: Decimal,
    pub buyer_utility: f64,
    pub seller_utility: Option<f64>,
    pub valid: bool,
    #[serde(default)]
    pub policy_violations: Vec<PolicyViolation>,
    #[serde(default)]
    pub guardrail_alerts: Vec<GuardrailAlert>,
    pub rationale: String,
}

/// Append-only scenario memory entry for one round of one vendor's negotiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundMemory {
    pub request_id: String,
    pub vendor_id: String,
    pub round_number: u32,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub actor: ActorRole,
    pub strategy: String,
    pub selected: CandidateEvaluation,
    #[serde(default)]
    pub rejected: Vec<CandidateEvaluation>,
    pub decision: NegotiationDecision,
    pub delta_utility: f64,
    pub delta_tco: Decimal,
}

/// Tags used to index `NegotiationMemory` for retrieval (§4.K): category, a
/// quantity bucket, must-have tags, and a budget-tightness tag.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScenarioTags {
    pub category: Option<String>,
    pub quantity_bucket: Option<String>,
    pub must_have_tags: Vec<String>,
    pub budget_tightness: Option<String>,
}

impl ScenarioTags {
    /// Flattened tag set for Jaccard similarity scoring.
    pub fn as_set(&self) -> std::collections::BTreeSet<String> {
        let mut set = std::collections::BTreeSet::new();
        if let Some(c) = &self.category {
            set.insert(format!("category:{c}"));
        }
        if let Some(q) = &self.quantity_bucket {
            set.insert(format!("qty:{q}"));
        }
        for tag in &self.must_have_tags {
            set.insert(format!("must_have:{tag}"));
        }
        if let Some(b) = &self.budget_tightness {
            set.insert(format!("budget:{b}"));
        }
        set
    }
}

/// Structured candidate/decision memory for one (request, vendor) negotiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NegotiationMemory {
    pub request_id: String,
    pub vendor_id: String,
    pub scenario_tags: ScenarioTags,
    #[serde(default)]
    pub rounds: Vec<RoundMemory>,
    pub outcome: Option<NegotiationOutcome>,
    pub savings: Option<Decimal>,
}

impl NegotiationMemory {
    pub fn new(request_id: impl Into<String>, vendor_id: impl Into<String>, scenario_tags: ScenarioTags) -> Self {
        Self {
            request_id: request_id.into(),
            vendor_id: vendor_id.into(),
            scenario_tags,
            rounds: Vec::new(),
            outcome: None,
            savings: None,
        }
    }

    pub fn add_round(&mut self, round: RoundMemory) {
        self.rounds.push(round);
    }

    pub fn finalize(&mut self, outcome: NegotiationOutcome, savings: Decimal) {
        self.outcome = Some(outcome);
        self.savings = Some(savings);
    }
}
