use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ActorRole, Lever, NegotiationDecision, OfferComponents};

/// Point-in-time utility snapshot attached to a `MoveLog`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtilitySnapshot {
    pub buyer_utility: f64,
    pub seller_utility: Option<f64>,
    pub tco: Decimal,
}

/// Human- and machine-readable record of a single actor's move in a round (§4.J, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveLog {
    pub actor: ActorRole,
    pub round_number: u32,
    pub offer: OfferComponents,
    pub lever: Option<Lever>,
    #[serde(default)]
    pub rationale: Vec<String>,
    pub utility: UtilitySnapshot,
    pub decision: Option<NegotiationDecision>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub policy_notes: Vec<String>,
    #[serde(default)]
    pub guardrail_notes: Vec<String>,
    #[serde(default)]
    pub compliance_notes: Vec<String>,
}

/// One round's worth of moves; §8 Audit-Completeness requires exactly a buyer and
/// a seller `MoveLog` per `round_number`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RoundLog {
    pub moves: Vec<MoveLog>,
}

impl RoundLog {
    pub fn push(&mut self, entry: MoveLog) {
        self.moves.push(entry);
    }

    /// True iff every `round_number` present has exactly two moves, one buyer one
    /// seller (§8 Audit-Completeness).
    pub fn is_complete(&self) -> bool {
        let mut by_round: BTreeMap<u32, Vec<ActorRole>> = BTreeMap::new();
        for m in &self.moves {
            by_round.entry(m.round_number).or_default().push(m.actor);
        }
        by_round.values().all(|actors| {
            actors.len() == 2
                && actors.contains(&ActorRole::Buyer)
                && actors.contains(&ActorRole::Seller)
        })
    }
}

/// A free-form event on the per-request audit stream (e.g. `vendor.negotiation_started`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub name: String,
    pub request_id: String,
    pub vendor_id: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub data: BTreeMap<String, serde_json::Value>,
}
