use std::collections::HashMap;
use std::sync::Arc;

use procur_types::{AuditEvent, MoveLog, RoundLog};
use tokio::sync::{Mutex, RwLock};

type Key = (String, String);

/// Append-only per-(request, vendor) round log plus a per-request event stream
/// (§4.J). Writer access is serialized per key through a sharded map of async
/// mutexes rather than one global lock (§5 task model, §9 redesign flag on
/// thread-unsafe in-memory dicts).
#[derive(Debug, Default)]
pub struct AuditTrail {
    rounds: RwLock<HashMap<Key, Arc<Mutex<RoundLog>>>>,
    events: RwLock<HashMap<String, Arc<Mutex<Vec<AuditEvent>>>>>,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    async fn round_log_handle(&self, request_id: &str, vendor_id: &str) -> Arc<Mutex<RoundLog>> {
        let key = (request_id.to_string(), vendor_id.to_string());
        if let Some(handle) = self.rounds.read().await.get(&key) {
            return handle.clone();
        }
        let mut rounds = self.rounds.write().await;
        rounds
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(RoundLog::default())))
            .clone()
    }

    async fn event_stream_handle(&self, request_id: &str) -> Arc<Mutex<Vec<AuditEvent>>> {
        if let Some(handle) = self.events.read().await.get(request_id) {
            return handle.clone();
        }
        let mut events = self.events.write().await;
        events
            .entry(request_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Vec::new())))
            .clone()
    }

    /// Appends one actor's move to the (request, vendor) round log.
    pub async fn record_move(&self, request_id: &str, vendor_id: &str, entry: MoveLog) {
        let handle = self.round_log_handle(request_id, vendor_id).await;
        handle.lock().await.push(entry);
    }

    /// Appends a free-form lifecycle event to the request's event stream.
    pub async fn record_event(&self, event: AuditEvent) {
        let handle = self.event_stream_handle(&event.request_id).await;
        handle.lock().await.push(event);
    }

    /// Snapshot of one vendor's round log, for export or the §8 completeness check.
    pub async fn export_round_log(&self, request_id: &str, vendor_id: &str) -> RoundLog {
        self.round_log_handle(request_id, vendor_id).await.lock().await.clone()
    }

    /// Every vendor's round log for a request, keyed by vendor id.
    pub async fn export_request(&self, request_id: &str) -> HashMap<String, RoundLog> {
        let rounds = self.rounds.read().await;
        let mut out = HashMap::new();
        for ((req, vendor), handle) in rounds.iter() {
            if req == request_id {
                out.insert(vendor.clone(), handle.lock().await.clone());
            }
        }
        out
    }

    pub async fn export_events(&self, request_id: &str) -> Vec<AuditEvent> {
        self.event_stream_handle(request_id).await.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procur_types::{ActorRole, NegotiationDecision, OfferComponents, PaymentTerms, UtilitySnapshot};
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;

    fn move_log(actor: ActorRole, round_number: u32) -> MoveLog {
        MoveLog {
            actor,
            round_number,
            offer: OfferComponents {
                unit_price: Decimal::new(1000, 0),
                currency: "USD".into(),
                quantity: 10,
                term_months: 12,
                payment_terms: PaymentTerms::Net30,
                one_time_fees: BTreeMap::new(),
                warranty_support: None,
                exclusions: Vec::new(),
                notes: Vec::new(),
            },
            lever: None,
            rationale: Vec::new(),
            utility: UtilitySnapshot {
                buyer_utility: 0.8,
                seller_utility: Some(0.5),
                tco: Decimal::new(120_000, 0),
            },
            decision: Some(NegotiationDecision::Counter),
            timestamp: chrono::DateTime::UNIX_EPOCH,
            policy_notes: Vec::new(),
            guardrail_notes: Vec::new(),
            compliance_notes: Vec::new(),
        }
    }

    #[tokio::test]
    async fn round_log_completeness_after_both_moves() {
        let trail = AuditTrail::new();
        trail.record_move("req-1", "vendor-1", move_log(ActorRole::Buyer, 1)).await;
        trail.record_move("req-1", "vendor-1", move_log(ActorRole::Seller, 1)).await;
        let log = trail.export_round_log("req-1", "vendor-1").await;
        assert!(log.is_complete());
    }

    #[tokio::test]
    async fn distinct_vendors_stay_isolated() {
        let trail = AuditTrail::new();
        trail.record_move("req-1", "vendor-1", move_log(ActorRole::Buyer, 1)).await;
        trail.record_move("req-1", "vendor-2", move_log(ActorRole::Buyer, 1)).await;
        let all = trail.export_request("req-1").await;
        assert_eq!(all.len(), 2);
    }
}
