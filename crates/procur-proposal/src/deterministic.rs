use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use procur_types::{
    ActorRole, BuyerStrategy, MachineRationale, NegotiationMessage, NextStepHint, OfferComponents, Request,
    RequestPolicyContext, RequestType, VendorNegotiationState,
};
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::ProposalError;
use crate::generator::{IntakeOutcome, ProposalGenerator};

/// Extracts structured request fields from free text with a handful of fixed
/// regexes, mirroring the reference intake's deterministic mock-client path:
/// no model call, just pattern matching over a few expected phrasings. This is
/// the implementation the core falls back to when no LLM-backed generator is
/// configured, or when one fails validation twice (§4.H step 4, §4.M).
#[derive(Debug, Default)]
pub struct DeterministicProposalGenerator;

fn quantity_pattern() -> Regex {
    Regex::new(r"(?i)(\d[\d,]*)\s*(seats|licenses|units|employees)").unwrap()
}

fn budget_pattern() -> Regex {
    Regex::new(r"(?i)\$\s*([\d,]+(?:\.\d+)?)\s*(k|m)?").unwrap()
}

fn compliance_pattern() -> Regex {
    Regex::new(r"(?i)\b(soc\s*2(?:\s*type\s*ii)?|iso[\s-]?27001|gdpr|hipaa|fedramp|pci[\s-]?dss|ccpa)\b").unwrap()
}

fn category_keywords() -> &'static [(&'static str, &'static str)] {
    &[
        ("crm", "crm"),
        ("payroll", "hr"),
        ("human resources", "hr"),
        ("security", "security"),
        ("analytics", "analytics"),
        ("business intelligence", "analytics"),
        ("erp", "erp"),
        ("inventory", "erp"),
    ]
}

fn parse_money(raw: &str, suffix: Option<&str>) -> Decimal {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    let base = digits.parse::<f64>().unwrap_or(0.0);
    let multiplier = match suffix.map(|s| s.to_ascii_lowercase()) {
        Some(ref s) if s == "k" => 1_000.0,
        Some(ref s) if s == "m" => 1_000_000.0,
        _ => 1.0,
    };
    Decimal::try_from(base * multiplier).unwrap_or(Decimal::ZERO)
}

#[async_trait]
impl ProposalGenerator for DeterministicProposalGenerator {
    async fn intake(&self, raw_text: &str, _policy_summary: &str) -> Result<IntakeOutcome, ProposalError> {
        let quantity = quantity_pattern()
            .captures(raw_text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().replace(',', "").parse::<u32>().ok());

        let Some(quantity) = quantity else {
            return Ok(IntakeOutcome::NeedsClarification(vec![procur_types::ClarificationQuestion {
                field: "quantity".to_string(),
                question: "How many seats/units/employees is this request for?".to_string(),
                required: true,
            }]));
        };

        let budget_max = budget_pattern()
            .captures(raw_text)
            .map(|c| parse_money(&c[1], c.get(2).map(|m| m.as_str())));

        let compliance_requirements: BTreeSet<String> = compliance_pattern()
            .find_iter(raw_text)
            .map(|m| m.as_str().to_ascii_lowercase())
            .collect();

        let lowered = raw_text.to_ascii_lowercase();
        let category = category_keywords()
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword))
            .map(|(_, category)| category.to_string());

        let mut specs = BTreeMap::new();
        if let Some(category) = category {
            specs.insert("category".to_string(), serde_json::json!(category));
        }

        let request = Request {
            request_id: format!("req-{}", uuid_like(raw_text)),
            requester_id: "unknown".to_string(),
            request_type: RequestType::Saas,
            description: raw_text.to_string(),
            specs,
            quantity,
            budget_min: None,
            budget_max,
            currency: "USD".to_string(),
            must_haves: BTreeSet::new(),
            nice_to_haves: BTreeSet::new(),
            compliance_requirements,
            billing_cadence: None,
            policy_context: RequestPolicyContext::default(),
            status: procur_types::RequestLifecycleState::Active,
        };

        Ok(IntakeOutcome::Ready(request))
    }

    async fn propose(
        &self,
        _request: &Request,
        _state: &VendorNegotiationState,
        strategy: BuyerStrategy,
        bundle: &OfferComponents,
        round: u32,
    ) -> Result<NegotiationMessage, ProposalError> {
        Ok(synthetic_message(ActorRole::Buyer, strategy, bundle.clone(), round))
    }
}

/// Deterministic hash used only to produce a stable-looking request id from
/// raw text; not a cryptographic identifier.
fn uuid_like(raw_text: &str) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    raw_text.hash(&mut hasher);
    hasher.finish()
}

/// Builds a `NegotiationMessage` straight from a chosen bundle with a synthetic
/// rationale, used both by the deterministic generator and as the final
/// fallback after an LLM-backed generator exhausts its retries (§4.H step 4).
pub fn synthetic_message(actor: ActorRole, strategy: BuyerStrategy, bundle: OfferComponents, round: u32) -> NegotiationMessage {
    NegotiationMessage {
        actor,
        round,
        proposal: bundle,
        justification_bullets: vec![format!("deterministic {strategy:?} bundle for round {round}")],
        machine_rationale: MachineRationale {
            score_components: BTreeMap::new(),
            constraints_respected: vec!["vendor_floor".to_string()],
            concession_taken: Some(format!("{strategy:?}")),
        },
        next_step_hint: NextStepHint::Counter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn intake_extracts_quantity_and_budget() {
        let generator = DeterministicProposalGenerator;
        let outcome = generator
            .intake("We need a CRM for 150 seats, budget around $180k, must be SOC 2 Type II.", "")
            .await
            .unwrap();
        match outcome {
            IntakeOutcome::Ready(request) => {
                assert_eq!(request.quantity, 150);
                assert_eq!(request.budget_max, Some(Decimal::new(180_000, 0)));
                assert!(request.compliance_requirements.iter().any(|c| c.contains("soc")));
            }
            IntakeOutcome::NeedsClarification(_) => panic!("expected a ready request"),
        }
    }

    #[tokio::test]
    async fn missing_quantity_requests_clarification() {
        let generator = DeterministicProposalGenerator;
        let outcome = generator.intake("We need some new software.", "").await.unwrap();
        matches!(outcome, IntakeOutcome::NeedsClarification(_));
    }
}
