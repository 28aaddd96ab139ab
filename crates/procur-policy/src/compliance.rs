use procur_evaluation::compliance::ComplianceEvidence;
use procur_types::{
    ComplianceAssessment, ComplianceFinding, ComplianceStatus, ControlEntry, ControlStatus,
    Request, RiskCard, VendorProfile,
};

use crate::catalog::{lookup_compliance, normalize_identifier, ComplianceFrameworkEntry};

/// Builds `ComplianceAssessment`/`RiskCard` results by joining a request's stated
/// requirements against a vendor's certifications through the compliance catalog,
/// then folding per-framework weights with the evaluation kernel (§4.D).
#[derive(Debug, Clone, Default)]
pub struct ComplianceService;

impl ComplianceService {
    pub fn new() -> Self {
        Self
    }

    /// Joins against `vendor.certifications ∪ vendor.regions` (§4.D): an explicit
    /// certification always counts, and absent that, operating in the framework's
    /// associated region satisfies it too (an EU requirement is met by an EU
    /// region, a US requirement by a US region).
    fn evidence_for(vendor: &VendorProfile, canonical: &str, entry: Option<&ComplianceFrameworkEntry>) -> ComplianceEvidence {
        let certified = vendor
            .certifications
            .iter()
            .any(|c| normalize_identifier(c) == canonical);
        if certified {
            return ComplianceEvidence::Certified;
        }

        let region_satisfied = entry
            .and_then(|e| e.region_hint)
            .map(|region_hint| {
                vendor
                    .regions
                    .iter()
                    .any(|region| region.trim().eq_ignore_ascii_case(region_hint))
            })
            .unwrap_or(false);
        if region_satisfied {
            ComplianceEvidence::AttestedWithReport
        } else {
            ComplianceEvidence::None
        }
    }

    /// §4.D: a request with no compliance requirements is vacuously satisfied.
    /// Otherwise each requirement is looked up in the catalog (unknown frameworks
    /// degrade to a non-blocking "missing" finding rather than erroring) and
    /// scored through the kernel's weight table.
    pub fn assess_vendor(&self, request: &Request, vendor: &VendorProfile) -> ComplianceAssessment {
        if request.compliance_requirements.is_empty() {
            return ComplianceAssessment::vacuous();
        }

        let mut findings = Vec::new();
        let mut evidence = Vec::new();
        let mut blocking = false;

        for requirement in &request.compliance_requirements {
            let canonical = normalize_identifier(requirement);
            let entry = lookup_compliance(&canonical);
            let this_evidence = Self::evidence_for(vendor, &canonical, entry);
            let status = match this_evidence {
                ComplianceEvidence::None => ComplianceStatus::Missing,
                _ => ComplianceStatus::Compliant,
            };
            let framework_blocks = entry.map(|e| e.blocking_if_missing).unwrap_or(false)
                && status == ComplianceStatus::Missing;
            blocking |= framework_blocks;

            findings.push(ComplianceFinding {
                framework: canonical,
                status,
                blocking: framework_blocks,
                evidence: match this_evidence {
                    ComplianceEvidence::Certified => Some("certified".to_string()),
                    ComplianceEvidence::AttestedWithReport => Some("region_match".to_string()),
                    _ => None,
                },
            });
            evidence.push(this_evidence);
        }

        let (score, kernel_blocking) = procur_evaluation::compliance::compute_compliance_score(&evidence);

        ComplianceAssessment {
            score,
            findings,
            blocking: blocking || kernel_blocking,
        }
    }

    /// Derives a risk card from the same assessment: each blocking finding
    /// becomes a `Breached` control, each satisfied requirement a `Met` control.
    pub fn build_risk_card(&self, request: &Request, vendor: &VendorProfile) -> RiskCard {
        let assessment = self.assess_vendor(request, vendor);
        let controls = assessment
            .findings
            .iter()
            .map(|finding| ControlEntry {
                control: finding.framework.clone(),
                status: if finding.blocking {
                    ControlStatus::Breached
                } else if finding.status == ComplianceStatus::Missing {
                    ControlStatus::Partial
                } else {
                    ControlStatus::Met
                },
            })
            .collect();

        RiskCard {
            vendor_id: vendor.vendor_id.clone(),
            controls,
            blocking_breach: assessment.blocking,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procur_types::{ExchangePolicy, PaymentTerms, ReliabilityStats, RiskLevel, VendorGuardrails};
    use rust_decimal::Decimal;
    use std::collections::{BTreeMap, BTreeSet};

    fn vendor_with_regions(certifications: &[&str], regions: &[&str]) -> VendorProfile {
        VendorProfile {
            vendor_id: "vendor-1".into(),
            name: "Acme".into(),
            category: Some("saas".into()),
            capability_tags: BTreeSet::new(),
            certifications: certifications.iter().map(|s| s.to_string()).collect(),
            regions: regions.iter().map(|s| s.to_string()).collect(),
            price_tiers: BTreeMap::new(),
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

    fn vendor(certifications: &[&str]) -> VendorProfile {
        VendorProfile {
            vendor_id: "vendor-1".into(),
            name: "Acme".into(),
            category: Some("saas".into()),
            capability_tags: BTreeSet::new(),
            certifications: certifications.iter().map(|s| s.to_string()).collect(),
            regions: BTreeSet::new(),
            price_tiers: BTreeMap::new(),
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

    fn request_requiring(frameworks: &[&str]) -> Request {
        use procur_types::{RequestLifecycleState, RequestPolicyContext, RequestType};
        Request {
            request_id: "req-1".into(),
            requester_id: "buyer-1".into(),
            request_type: RequestType::Saas,
            description: "desc".into(),
            specs: BTreeMap::new(),
            quantity: 10,
            budget_min: None,
            budget_max: None,
            currency: "USD".into(),
            must_haves: BTreeSet::new(),
            nice_to_haves: BTreeSet::new(),
            compliance_requirements: frameworks.iter().map(|s| s.to_string()).collect(),
            billing_cadence: None,
            policy_context: RequestPolicyContext::default(),
            status: RequestLifecycleState::Active,
        }
    }

    #[test]
    fn no_requirements_is_vacuous() {
        let service = ComplianceService::new();
        let assessment = service.assess_vendor(&request_requiring(&[]), &vendor(&[]));
        assert_eq!(assessment.score, 1.0);
        assert!(!assessment.blocking);
    }

    #[test]
    fn missing_known_blocking_framework_blocks() {
        let service = ComplianceService::new();
        let assessment = service.assess_vendor(&request_requiring(&["soc2"]), &vendor(&[]));
        assert!(assessment.blocking);
    }

    #[test]
    fn certified_framework_satisfies() {
        let service = ComplianceService::new();
        let assessment = service.assess_vendor(&request_requiring(&["soc2"]), &vendor(&["SOC 2 Type II"]));
        assert!(!assessment.blocking);
        assert_eq!(assessment.findings[0].status, ComplianceStatus::Compliant);
    }

    #[test]
    fn eu_region_satisfies_an_eu_framework_without_certification() {
        let service = ComplianceService::new();
        let vendor = vendor_with_regions(&[], &["EU"]);
        let assessment = service.assess_vendor(&request_requiring(&["gdpr"]), &vendor);
        assert!(!assessment.blocking);
        assert_eq!(assessment.findings[0].status, ComplianceStatus::Compliant);
        assert_eq!(assessment.findings[0].evidence.as_deref(), Some("region_match"));
    }

    #[test]
    fn us_region_does_not_satisfy_an_eu_framework() {
        let service = ComplianceService::new();
        let vendor = vendor_with_regions(&[], &["us"]);
        let assessment = service.assess_vendor(&request_requiring(&["gdpr"]), &vendor);
        assert!(assessment.blocking);
        assert_eq!(assessment.findings[0].status, ComplianceStatus::Missing);
    }
}
