use std::collections::BTreeSet;

use procur_types::{NegotiationMemory, RoundMemory};
use tokio::sync::RwLock;

fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// A compact view of a remembered negotiation, suitable for injecting into a
/// proposal generator's context (§4.K).
#[derive(Debug, Clone)]
pub struct RetrievedExemplar {
    pub request_id: String,
    pub vendor_id: String,
    pub similarity: f64,
    pub recent_rounds: Vec<RoundMemory>,
}

const MAX_EXEMPLAR_ROUNDS: usize = 3;

/// Tag-indexed in-memory store over every finalized `NegotiationMemory` seen so
/// far, scored by Jaccard similarity over `scenario_tags` (§4.K). Missing or
/// empty index degrades to an empty result list rather than erroring, per the
/// "optional collaborators degrade to synthetic behavior" rule.
#[derive(Debug, Default)]
pub struct RetrievalIndex {
    memories: RwLock<Vec<NegotiationMemory>>,
}

impl RetrievalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register_memory(&self, memory: NegotiationMemory) {
        self.memories.write().await.push(memory);
    }

    /// Top-`k` exemplars by scenario-tag similarity to `tags`, each carrying its
    /// last `MAX_EXEMPLAR_ROUNDS` rounds.
    pub async fn retrieve(&self, tags: &BTreeSet<String>, k: usize) -> Vec<RetrievedExemplar> {
        let memories = self.memories.read().await;
        let mut scored: Vec<RetrievedExemplar> = memories
            .iter()
            .map(|memory| {
                let similarity = jaccard(tags, &memory.scenario_tags.as_set());
                let recent_rounds = memory
                    .rounds
                    .iter()
                    .rev()
                    .take(MAX_EXEMPLAR_ROUNDS)
                    .rev()
                    .cloned()
                    .collect();
                RetrievedExemplar {
                    request_id: memory.request_id.clone(),
                    vendor_id: memory.vendor_id.clone(),
                    similarity,
                    recent_rounds,
                }
            })
            .filter(|exemplar| exemplar.similarity > 0.0)
            .collect();

        scored.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procur_types::ScenarioTags;

    fn memory_with_category(category: &str) -> NegotiationMemory {
        NegotiationMemory::new(
            "req-1",
            "vendor-1",
            ScenarioTags {
                category: Some(category.to_string()),
                quantity_bucket: Some("medium".to_string()),
                must_have_tags: vec!["sso".to_string()],
                budget_tightness: Some("tight".to_string()),
            },
        )
    }

    #[tokio::test]
    async fn empty_index_returns_nothing() {
        let index = RetrievalIndex::new();
        let result = index.retrieve(&BTreeSet::from(["category:crm".to_string()]), 3).await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn retrieves_most_similar_first() {
        let index = RetrievalIndex::new();
        index.register_memory(memory_with_category("crm")).await;
        index.register_memory(memory_with_category("erp")).await;

        let query = memory_with_category("crm").scenario_tags.as_set();
        let results = index.retrieve(&query, 2).await;
        assert_eq!(results[0].vendor_id, "vendor-1");
        assert!(results[0].similarity >= results.last().unwrap().similarity);
    }
}
