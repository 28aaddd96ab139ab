use procur_types::{
    OfferComponents, PolicyResult, PolicyViolation, Request, VendorProfile,
};
use rust_decimal::Decimal;

/// Risk levels above this numeric score (read from `request.specs.risk_score`)
/// trigger an additional approver in `determine_approvals`.
const DEFAULT_RISK_THRESHOLD: f64 = 0.7;

/// Tunables the policy engine owns as an instance, never as globals (§9 redesign
/// flag on global mutable constants).
#[derive(Debug, Clone, Copy)]
pub struct PolicyEngineConfig {
    /// Projected spend may exceed `budget_cap` by this multiplier before blocking.
    pub budget_cap_overrun_multiplier: f64,
    pub default_risk_threshold: f64,
}

impl Default for PolicyEngineConfig {
    fn default() -> Self {
        Self {
            budget_cap_overrun_multiplier: 1.05,
            default_risk_threshold: DEFAULT_RISK_THRESHOLD,
        }
    }
}

/// Validates requests and offers against budget, term, payment-term, and
/// vendor-floor rules (§4.B).
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    config: PolicyEngineConfig,
}

impl PolicyEngine {
    pub fn new(config: PolicyEngineConfig) -> Self {
        Self { config }
    }

    fn risk_score(request: &Request) -> Option<f64> {
        request
            .specs
            .get("risk_score")
            .and_then(|v| v.as_f64())
    }

    /// Enforces budget cap and risk threshold at intake time.
    pub fn validate_request(&self, request: &Request) -> PolicyResult {
        let mut result = PolicyResult::ok();

        if let (Some(cap), Some(max)) = (request.policy_context.budget_cap, request.budget_max) {
            if max > cap {
                result.push(PolicyViolation {
                    code: "budget_cap_exceeded".to_string(),
                    message: format!("requested budget_max {max} exceeds policy cap {cap}"),
                    blocking: true,
                });
            }
        }

        if let Some(score) = Self::risk_score(request) {
            let threshold = request
                .policy_context
                .risk_threshold
                .unwrap_or(self.config.default_risk_threshold);
            if score > threshold {
                result.push(PolicyViolation {
                    code: "risk_threshold_exceeded".to_string(),
                    message: format!("risk score {score} exceeds threshold {threshold}"),
                    blocking: true,
                });
            }
        }

        result
    }

    /// Validates an in-flight offer (buyer proposal or seller counter) against
    /// projected spend, term caps, payment-term allowances, and the vendor floor
    /// (§4.B). `vendor` is absent for the buyer's very first anchor, which has not
    /// yet been matched to a specific vendor's guardrails.
    pub fn validate_offer(
        &self,
        request: &Request,
        offer: &OfferComponents,
        vendor: Option<&VendorProfile>,
        is_buyer_proposal: bool,
    ) -> PolicyResult {
        let mut result = PolicyResult::ok();

        let projected_spend = offer.unit_price * Decimal::from(offer.quantity);
        if let Some(cap) = request.policy_context.budget_cap {
            let overrun_cap = cap * Decimal::try_from(self.config.budget_cap_overrun_multiplier)
                .unwrap_or(cap);
            if projected_spend > overrun_cap {
                result.push(PolicyViolation {
                    code: "projected_spend_exceeds_cap".to_string(),
                    message: format!(
                        "projected spend {projected_spend} exceeds cap·{} = {overrun_cap}",
                        self.config.budget_cap_overrun_multiplier
                    ),
                    blocking: true,
                });
            }
        }

        if let Some(max_term) = request.specs.get("max_term_months").and_then(|v| v.as_u64()) {
            if offer.term_months as u64 > max_term {
                result.push(PolicyViolation {
                    code: "term_exceeds_max".to_string(),
                    message: format!("term_months {} exceeds max {max_term}", offer.term_months),
                    blocking: true,
                });
            }
        }

        if let Some(vendor) = vendor {
            if !vendor.guardrails.payment_terms_allowed.contains(&offer.payment_terms) {
                result.push(PolicyViolation {
                    code: "payment_terms_not_allowed".to_string(),
                    message: format!("{:?} not in vendor's allowed payment terms", offer.payment_terms),
                    blocking: true,
                });
            }

            if !is_buyer_proposal && offer.unit_price < vendor.guardrails.price_floor {
                result.push(PolicyViolation {
                    code: "below_vendor_floor".to_string(),
                    message: format!(
                        "unit_price {} is below vendor floor {}",
                        offer.unit_price, vendor.guardrails.price_floor
                    ),
                    blocking: true,
                });
            }
        }

        if is_buyer_proposal {
            if let Some(min_acceptance) = request
                .specs
                .get("minimum_acceptance_price")
                .and_then(|v| v.as_f64())
            {
                let min_acceptance = Decimal::try_from(min_acceptance).unwrap_or(Decimal::ZERO);
                if offer.unit_price > min_acceptance {
                    result.push(PolicyViolation {
                        code: "above_minimum_acceptance_price".to_string(),
                        message: format!(
                            "buyer proposal {} exceeds minimum_acceptance_price {min_acceptance}",
                            offer.unit_price
                        ),
                        blocking: false,
                    });
                }
            }
        }

        result
    }

    /// Guards a concession floor directly: `proposed < floor` is always blocking.
    pub fn enforce_concession_floor(&self, floor: Decimal, proposed: Decimal) -> PolicyResult {
        let mut result = PolicyResult::ok();
        if proposed < floor {
            result.push(PolicyViolation {
                code: "concession_below_floor".to_string(),
                message: format!("proposed {proposed} is below floor {floor}"),
                blocking: true,
            });
        }
        result
    }

    /// Approver roles required for a projected spend, escalating past the
    /// request's own approval chain when risk is elevated.
    pub fn determine_approvals(&self, request: &Request, projected_spend: Decimal) -> Vec<String> {
        let mut approvers = request.policy_context.approval_chain.clone();
        if let Some(cap) = request.policy_context.budget_cap {
            if projected_spend > cap {
                approvers.push("finance_director".to_string());
            }
        }
        if let Some(score) = Self::risk_score(request) {
            if score > self.config.default_risk_threshold {
                approvers.push("risk_officer".to_string());
            }
        }
        approvers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procur_types::{PaymentTerms, RequestPolicyContext, RequestType};
    use std::collections::{BTreeMap, BTreeSet};

    fn base_request() -> Request {
        Request {
            request_id: "req-1".into(),
            requester_id: "buyer-1".into(),
            request_type: RequestType::Saas,
            description: "CRM for sales team".into(),
            specs: BTreeMap::new(),
            quantity: 100,
            budget_min: None,
            budget_max: Some(Decimal::new(100_000, 0)),
            currency: "USD".into(),
            must_haves: BTreeSet::new(),
            nice_to_haves: BTreeSet::new(),
            compliance_requirements: BTreeSet::new(),
            billing_cadence: None,
            policy_context: RequestPolicyContext {
                budget_cap: Some(Decimal::new(100_000, 0)),
                ..Default::default()
            },
            status: procur_types::RequestLifecycleState::Active,
        }
    }

    fn offer(unit_price: Decimal) -> OfferComponents {
        OfferComponents {
            unit_price,
            currency: "USD".into(),
            quantity: 100,
            term_months: 12,
            payment_terms: PaymentTerms::Net30,
            one_time_fees: BTreeMap::new(),
            warranty_support: None,
            exclusions: Vec::new(),
            notes: Vec::new(),
        }
    }

    #[test]
    fn spend_within_cap_overrun_is_valid() {
        let engine = PolicyEngine::new(PolicyEngineConfig::default());
        let request = base_request();
        // 1020/unit * 100 = 102000, within 1.05 * 100000 = 105000
        let result = engine.validate_offer(&request, &offer(Decimal::new(1020, 0)), None, true);
        assert!(result.valid());
    }

    #[test]
    fn spend_beyond_cap_overrun_blocks() {
        let engine = PolicyEngine::new(PolicyEngineConfig::default());
        let request = base_request();
        let result = engine.validate_offer(&request, &offer(Decimal::new(2000, 0)), None, true);
        assert!(!result.valid());
    }
}
