use std::collections::BTreeSet;

use procur_types::Request;

/// Category universe the matcher infers over and matches against.
pub const CANDIDATE_CATEGORIES: &[&str] = &["crm", "hr", "security", "analytics", "erp", "saas"];

/// Description phrases and feature tokens that count as evidence for each
/// category. `saas` is the generic fallback and loses ties against any other.
fn category_signals(category: &str) -> (&'static [&'static str], &'static [&'static str]) {
    match category {
        "crm" => (
            &["customer relationship", "sales pipeline", "lead management"],
            &["crm", "pipeline", "lead-scoring", "contact-management"],
        ),
        "hr" => (
            &["human resources", "payroll", "employee onboarding"],
            &["hr", "payroll", "onboarding", "benefits"],
        ),
        "security" => (
            &["threat detection", "vulnerability", "endpoint protection"],
            &["siem", "edr", "vulnerability-scanning", "mfa"],
        ),
        "analytics" => (
            &["business intelligence", "data warehouse", "dashboards"],
            &["bi", "dashboards", "data-pipeline", "reporting"],
        ),
        "erp" => (
            &["enterprise resource", "supply chain", "inventory management"],
            &["erp", "inventory", "procurement", "supply-chain"],
        ),
        _ => (&[], &[]),
    }
}

fn count_hits(haystack: &str, needles: &[&str]) -> u32 {
    needles.iter().filter(|n| haystack.contains(*n)).count() as u32
}

/// §4.E step 1: infers the most likely category for a request from its free-text
/// description, its feature tags, and an explicit `specs.category` override.
/// Does not mutate `request`; callers that want to cache the result write it
/// into `specs._category_inference` themselves before the next lookup.
pub fn infer_category(request: &Request) -> String {
    if let Some(explicit) = request.specs.get("category").and_then(|v| v.as_str()) {
        return explicit.to_ascii_lowercase();
    }
    if let Some(cached) = request.specs.get("_category_inference").and_then(|v| v.as_str()) {
        return cached.to_string();
    }

    let description = request.description.to_ascii_lowercase();
    let feature_tokens: BTreeSet<String> = request
        .must_haves
        .iter()
        .chain(request.nice_to_haves.iter())
        .map(|tag| tag.to_ascii_lowercase())
        .collect();

    let mut best = "saas";
    let mut best_score = 0u32;
    for &category in CANDIDATE_CATEGORIES {
        if category == "saas" {
            continue;
        }
        let (phrases, tokens) = category_signals(category);
        let score = count_hits(&description, phrases)
            + feature_tokens
                .iter()
                .filter(|tag| tokens.contains(&tag.as_str()))
                .count() as u32;
        if score > best_score {
            best_score = score;
            best = category;
        }
    }

    best.to_string()
}

/// §4.E step 2: category alias table (`crm` ↔ `customer-relationship-management`,
/// etc). Every category matches itself and `saas`, the generic umbrella.
pub fn category_matches(inferred: &str, vendor_category: &str) -> bool {
    let inferred = inferred.to_ascii_lowercase();
    let vendor_category = vendor_category.to_ascii_lowercase();

    if inferred == vendor_category {
        return true;
    }
    if inferred == "saas" || vendor_category == "saas" {
        return true;
    }

    let aliases: &[&[&str]] = &[
        &["crm", "customer-relationship-management", "customer relationship management"],
        &["hr", "human-resources", "human resources", "hcm"],
        &["security", "cybersecurity", "infosec"],
        &["analytics", "business-intelligence", "bi"],
        &["erp", "enterprise-resource-planning", "enterprise resource planning"],
    ];

    aliases
        .iter()
        .any(|group| group.contains(&inferred.as_str()) && group.contains(&vendor_category.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn request_with(description: &str, tags: &[&str]) -> Request {
        use procur_types::{RequestLifecycleState, RequestPolicyContext, RequestType};
        Request {
            request_id: "req-1".into(),
            requester_id: "buyer-1".into(),
            request_type: RequestType::Saas,
            description: description.into(),
            specs: BTreeMap::new(),
            quantity: 10,
            budget_min: None,
            budget_max: None,
            currency: "USD".into(),
            must_haves: tags.iter().map(|t| t.to_string()).collect(),
            nice_to_haves: BTreeSet::new(),
            compliance_requirements: BTreeSet::new(),
            billing_cadence: None,
            policy_context: RequestPolicyContext::default(),
            status: RequestLifecycleState::Active,
        }
    }

    #[test]
    fn infers_crm_from_description() {
        let request = request_with("Looking for a sales pipeline and lead management tool", &[]);
        assert_eq!(infer_category(&request), "crm");
    }

    #[test]
    fn falls_back_to_saas_with_no_signal() {
        let request = request_with("Need some software", &[]);
        assert_eq!(infer_category(&request), "saas");
    }

    #[test]
    fn alias_table_matches_hyphenated_form() {
        assert!(category_matches("crm", "customer-relationship-management"));
        assert!(!category_matches("crm", "erp"));
    }
}
