use std::collections::BTreeMap;

use procur_evaluation::feature::{compute_feature_score, SynonymMap};
use procur_evaluation::sla::{compute_sla_score, SupportTier};
use procur_policy::compliance::ComplianceService;
use procur_types::{FeatureMatch, Request, VendorMatchSummary, VendorProfile};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::category::{category_matches, infer_category};

/// Weights for the §4.E composite score; the fixed mix the spec prescribes.
#[derive(Debug, Clone, Copy)]
pub struct MatchWeights {
    pub feature: f64,
    pub compliance: f64,
    pub price: f64,
    pub sla: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            feature: 0.45,
            compliance: 0.30,
            price: 0.15,
            sla: 0.10,
        }
    }
}

/// Stateless vendor matcher (§4.E). Holds only the compliance service it
/// delegates to and the synonym map/weights callers configure.
#[derive(Debug, Clone)]
pub struct VendorMatcher {
    compliance: ComplianceService,
    synonyms: SynonymMap,
    weights: MatchWeights,
}

impl VendorMatcher {
    pub fn new(synonyms: SynonymMap, weights: MatchWeights) -> Self {
        Self {
            compliance: ComplianceService::new(),
            synonyms,
            weights,
        }
    }

    /// Evaluates one vendor against a request, producing the full fit picture
    /// the shortlist gate and presentation layer both consume.
    pub fn evaluate_vendor_against_request(
        &self,
        request: &Request,
        vendor: &VendorProfile,
        budget_per_unit: Decimal,
        optional_feature_weights: Option<&BTreeMap<String, f64>>,
    ) -> VendorMatchSummary {
        let inferred_category = infer_category(request);
        let category_match = vendor
            .category
            .as_deref()
            .map(|vendor_category| category_matches(&inferred_category, vendor_category))
            .unwrap_or(false);

        let feature_result = compute_feature_score(
            &request.must_haves,
            optional_feature_weights,
            &vendor.capability_tags,
            &self.synonyms,
        );

        let compliance = self.compliance.assess_vendor(request, vendor);

        let support_tier = vendor
            .reliability_stats
            .support_tier
            .as_deref()
            .map(SupportTier::parse)
            .unwrap_or(SupportTier::Unknown);
        let sla_score = compute_sla_score(vendor.reliability_stats.sla_pct, support_tier);

        let list_price = vendor.list_price(request.quantity);
        let price_fit = if list_price > Decimal::ZERO {
            (budget_per_unit / list_price).to_f64().unwrap_or(0.0).clamp(0.0, 1.2).min(1.0)
        } else {
            0.0
        };

        let hard_gate_failed = !category_match || compliance.blocking || feature_result.score == 0.0;
        let composite_score = if hard_gate_failed {
            0.0
        } else {
            self.weights.feature * feature_result.score
                + self.weights.compliance * compliance.score
                + self.weights.price * price_fit
                + self.weights.sla * sla_score
        };

        VendorMatchSummary {
            vendor_id: vendor.vendor_id.clone(),
            inferred_category,
            category_match,
            feature: FeatureMatch {
                score: feature_result.score,
                matched: feature_result.matched,
                missing: feature_result.missing,
            },
            compliance,
            sla_score,
            price_fit,
            composite_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procur_types::{
        ExchangePolicy, PaymentTerms, ReliabilityStats, RequestLifecycleState, RequestPolicyContext,
        RequestType, RiskLevel, VendorGuardrails,
    };
    use std::collections::BTreeSet;

    fn request() -> Request {
        Request {
            request_id: "req-1".into(),
            requester_id: "buyer-1".into(),
            request_type: RequestType::Saas,
            description: "sales pipeline tool".into(),
            specs: BTreeMap::new(),
            quantity: 10,
            budget_min: None,
            budget_max: None,
            currency: "USD".into(),
            must_haves: BTreeSet::from(["crm".to_string()]),
            nice_to_haves: BTreeSet::new(),
            compliance_requirements: BTreeSet::new(),
            billing_cadence: None,
            policy_context: RequestPolicyContext::default(),
            status: RequestLifecycleState::Active,
        }
    }

    fn vendor() -> VendorProfile {
        VendorProfile {
            vendor_id: "vendor-1".into(),
            name: "Acme".into(),
            category: Some("crm".into()),
            capability_tags: BTreeSet::from(["crm".to_string()]),
            certifications: BTreeSet::new(),
            regions: BTreeSet::new(),
            price_tiers: BTreeMap::from([(1, Decimal::new(1000, 0))]),
            guardrails: VendorGuardrails {
                price_floor: Decimal::new(800, 0),
                non_negotiables: BTreeSet::new(),
                payment_terms_allowed: BTreeSet::from([PaymentTerms::Net30]),
                response_window_hours: 24,
                contact_endpoints: BTreeSet::new(),
            },
            exchange_policy: ExchangePolicy {
                term_trade: BTreeMap::new(),
                payment_trade: BTreeMap::new(),
                value_add_offsets: BTreeMap::new(),
                min_step_abs: Decimal::new(1, 2),
                finalize_gap_abs: Decimal::new(10, 0),
                finalize_gap_pct: 0.02,
                close_extra_discount: 0.01,
                max_rounds: 8,
            },
            reliability_stats: ReliabilityStats::default(),
            risk_level: RiskLevel::Low,
            billing_cadence: None,
        }
    }

    #[test]
    fn matching_vendor_scores_positive_composite() {
        let matcher = VendorMatcher::new(SynonymMap::new(), MatchWeights::default());
        let summary = matcher.evaluate_vendor_against_request(&request(), &vendor(), Decimal::new(900, 0), None);
        assert!(summary.category_match);
        assert!(summary.composite_score > 0.0);
        assert!(summary.passes_shortlist_gate());
    }

    #[test]
    fn category_mismatch_zeroes_composite() {
        let matcher = VendorMatcher::new(SynonymMap::new(), MatchWeights::default());
        let mut req = request();
        req.specs.insert("category".to_string(), serde_json::json!("erp"));
        let summary = matcher.evaluate_vendor_against_request(&req, &vendor(), Decimal::new(900, 0), None);
        assert!(!summary.category_match);
        assert_eq!(summary.composite_score, 0.0);
        assert!(!summary.passes_shortlist_gate());
    }
}
