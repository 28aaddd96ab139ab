use std::collections::HashMap;
use std::sync::Arc;

use procur_types::{NegotiationMemory, NegotiationOutcome, RoundMemory, ScenarioTags};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, RwLock};

type Key = (String, String);

/// Append-only `NegotiationMemory` store keyed by (request, vendor), with the
/// same sharded-lock shape as `AuditTrail` (§4.J).
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<Key, Arc<Mutex<NegotiationMemory>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn handle(&self, request_id: &str, vendor_id: &str, scenario_tags: impl FnOnce() -> ScenarioTags) -> Arc<Mutex<NegotiationMemory>> {
        let key = (request_id.to_string(), vendor_id.to_string());
        if let Some(handle) = self.entries.read().await.get(&key) {
            return handle.clone();
        }
        let mut entries = self.entries.write().await;
        entries
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(NegotiationMemory::new(request_id, vendor_id, scenario_tags()))))
            .clone()
    }

    pub async fn add_round(&self, request_id: &str, vendor_id: &str, scenario_tags: ScenarioTags, round: RoundMemory) {
        let handle = self.handle(request_id, vendor_id, || scenario_tags).await;
        handle.lock().await.add_round(round);
    }

    pub async fn finalize(&self, request_id: &str, vendor_id: &str, outcome: NegotiationOutcome, savings: Decimal) {
        let handle = self.handle(request_id, vendor_id, ScenarioTags::default).await;
        handle.lock().await.finalize(outcome, savings);
    }

    pub async fn export(&self, request_id: &str, vendor_id: &str) -> Option<NegotiationMemory> {
        let key = (request_id.to_string(), vendor_id.to_string());
        let entries = self.entries.read().await;
        match entries.get(&key) {
            Some(handle) => Some(handle.lock().await.clone()),
            None => None,
        }
    }

    /// All negotiation memories recorded so far, for handoff to the retrieval
    /// index (§4.K).
    pub async fn all(&self) -> Vec<NegotiationMemory> {
        let entries = self.entries.read().await;
        let mut out = Vec::with_capacity(entries.len());
        for handle in entries.values() {
            out.push(handle.lock().await.clone());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procur_types::{ActorRole, CandidateEvaluation, NegotiationDecision, Offer, OfferComponents, OfferScore, PaymentTerms};
    use std::collections::BTreeMap;

    fn round_memory() -> RoundMemory {
        let offer = Offer {
            offer_id: "o-1".into(),
            request_id: "req-1".into(),
            vendor_id: "vendor-1".into(),
            components: OfferComponents {
                unit_price: Decimal::new(950, 0),
                currency: "USD".into(),
                quantity: 10,
                term_months: 12,
                payment_terms: PaymentTerms::Net30,
                one_time_fees: BTreeMap::new(),
                warranty_support: None,
                exclusions: Vec::new(),
                notes: Vec::new(),
            },
            score: Some(OfferScore {
                spec_match: 1.0,
                tco_norm: 1.0,
                risk: 0.0,
                time: 1.0,
                utility: 0.8,
                matched_features: Vec::new(),
                missing_features: Vec::new(),
            }),
            confidence: None,
            accepted: false,
        };
        RoundMemory {
            request_id: "req-1".into(),
            vendor_id: "vendor-1".into(),
            round_number: 1,
            timestamp: chrono::DateTime::UNIX_EPOCH,
            actor: ActorRole::Buyer,
            strategy: "price_anchor".into(),
            selected: CandidateEvaluation {
                offer,
                primary_lever: procur_types::Lever::Price,
                tco: Decimal::new(114_000, 0),
                buyer_utility: 0.8,
                seller_utility: None,
                valid: true,
                policy_violations: Vec::new(),
                guardrail_alerts: Vec::new(),
                rationale: "anchor".into(),
            },
            rejected: Vec::new(),
            decision: NegotiationDecision::Counter,
            delta_utility: 0.1,
            delta_tco: Decimal::new(-5000, 0),
        }
    }

    #[tokio::test]
    async fn add_round_then_finalize_round_trips() {
        let store = MemoryStore::new();
        store.add_round("req-1", "vendor-1", ScenarioTags::default(), round_memory()).await;
        store.finalize("req-1", "vendor-1", NegotiationOutcome::Accepted, Decimal::new(5000, 0)).await;
        let memory = store.export("req-1", "vendor-1").await.unwrap();
        assert_eq!(memory.rounds.len(), 1);
        assert_eq!(memory.outcome, Some(NegotiationOutcome::Accepted));
    }
}
