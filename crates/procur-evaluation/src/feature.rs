use std::collections::{BTreeMap, BTreeSet};

/// Canonicalizes tokens that mean the same capability under different names
/// (e.g. "leads" and "sequences" both canonicalize to "lead_management" in the
/// reference catalog). Callers own the map; the kernel has no built-in synonyms.
pub type SynonymMap = BTreeMap<String, String>;

fn canonicalize(token: &str, synonyms: &SynonymMap) -> String {
    synonyms.get(token).cloned().unwrap_or_else(|| token.to_string())
}

fn canonical_set(tokens: &BTreeSet<String>, synonyms: &SynonymMap) -> BTreeSet<String> {
    tokens.iter().map(|t| canonicalize(t, synonyms)).collect()
}

/// Result of scoring a vendor's capability tags against a request's feature needs.
#[derive(Debug, Clone)]
pub struct FeatureScoreResult {
    pub score: f64,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

/// Computes the §4.A feature score: `base = matched_required / |required|` (1.0 if
/// no required features), optionally blended `0.7·base + 0.3·optional` when an
/// optional weight map is supplied, else whichever term applies. Both sides are
/// normalized through `synonyms` before matching.
pub fn compute_feature_score(
    required: &BTreeSet<String>,
    optional_weights: Option<&BTreeMap<String, f64>>,
    vendor_tags: &BTreeSet<String>,
    synonyms: &SynonymMap,
) -> FeatureScoreResult {
    let vendor_canonical = canonical_set(vendor_tags, synonyms);
    let required_canonical = canonical_set(required, synonyms);

    let matched: Vec<String> = required_canonical
        .iter()
        .filter(|t| vendor_canonical.contains(*t))
        .cloned()
        .collect();
    let missing: Vec<String> = required_canonical
        .iter()
        .filter(|t| !vendor_canonical.contains(*t))
        .cloned()
        .collect();

    let base = if required_canonical.is_empty() {
        1.0
    } else {
        matched.len() as f64 / required_canonical.len() as f64
    };

    let score = match optional_weights {
        Some(weights) if !weights.is_empty() => {
            let total_weight: f64 = weights.values().sum();
            let matched_weight: f64 = weights
                .iter()
                .filter(|(tag, _)| vendor_canonical.contains(canonicalize(tag, synonyms).as_str()))
                .map(|(_, w)| *w)
                .sum();
            let optional_score = if total_weight > 0.0 {
                matched_weight / total_weight
            } else {
                0.0
            };
            if required_canonical.is_empty() {
                optional_score
            } else {
                0.7 * base + 0.3 * optional_score
            }
        }
        _ => base,
    };

    FeatureScoreResult {
        score: score.clamp(0.0, 1.0),
        matched,
        missing,
    }
}
