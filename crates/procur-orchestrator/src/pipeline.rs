use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use procur_agents::{AgentError, BuyerAgent, BuyerAgentConfig, SellerAgent};
use procur_audit::{AuditTrail, MemoryStore, RetrievalIndex};
use procur_config::EngineConfig;
use procur_matching::matcher::VendorMatcher;
use procur_metrics::MetricsCollector;
use procur_policy::{GuardrailService, PolicyEngine};
use procur_proposal::{IntakeOutcome, ProposalGenerator};
use procur_ratelimit::RateLimiter;
use procur_types::{
    AuditEvent, NegotiationMemory, NegotiationOutcome, PaymentTerms, Request, RiskLevel, ScenarioTags,
    VendorMatchSummary, VendorNegotiationState, VendorProfile,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::clock::Clock;
use crate::error::OrchestratorError;
use crate::result::{
    AuditExport, AuditSummary, BundleOffer, PipelineResult, PresentationBundles, ShortlistEntry, SupportSummary,
    VendorResult,
};
use crate::seed::SeedCatalog;

/// Wires every collaborator a run needs and drives the five-step pipeline
/// (intake, shortlist, fan-out, fan-in, presentation) described in §4.L.
/// Constructed through [`crate::builder::PipelineBuilder`], never directly.
pub struct Pipeline {
    engine_config: EngineConfig,
    policy: PolicyEngine,
    guardrail: GuardrailService,
    seller: SellerAgent,
    matcher: VendorMatcher,
    generator: Arc<dyn ProposalGenerator>,
    seed_catalog: Arc<dyn SeedCatalog>,
    audit: Arc<AuditTrail>,
    memory: Arc<MemoryStore>,
    retrieval: Arc<RetrievalIndex>,
    metrics: Arc<MetricsCollector>,
    rate_limiter: Arc<RateLimiter>,
    clock: Arc<dyn Clock>,
}

impl Pipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        engine_config: EngineConfig,
        policy: PolicyEngine,
        guardrail: GuardrailService,
        seller: SellerAgent,
        matcher: VendorMatcher,
        generator: Arc<dyn ProposalGenerator>,
        seed_catalog: Arc<dyn SeedCatalog>,
        audit: Arc<AuditTrail>,
        memory: Arc<MemoryStore>,
        retrieval: Arc<RetrievalIndex>,
        metrics: Arc<MetricsCollector>,
        rate_limiter: Arc<RateLimiter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            engine_config,
            policy,
            guardrail,
            seller,
            matcher,
            generator,
            seed_catalog,
            audit,
            memory,
            retrieval,
            metrics,
            rate_limiter,
            clock,
        }
    }

    /// §4.L: intake → shortlist → per-vendor fan-out → fan-in → presentation
    /// bundling. `clarification_answers`, when present, are folded back into
    /// the raw text for a second intake attempt; a run that still can't
    /// produce a `Request` returns its clarification questions rather than
    /// erroring.
    pub async fn run(
        &self,
        raw_text: &str,
        policy_summary: &str,
        clarification_answers: Option<&BTreeMap<String, String>>,
        top_n: usize,
    ) -> Result<PipelineResult, OrchestratorError> {
        let started = std::time::Instant::now();

        let intake = self
            .generator
            .intake(raw_text, policy_summary)
            .await
            .map_err(|source| OrchestratorError::IntakeFailed { source })?;

        let request = match intake {
            IntakeOutcome::Ready(request) => request,
            IntakeOutcome::NeedsClarification(questions) => match clarification_answers {
                None => return Ok(PipelineResult::needs_clarification(questions)),
                Some(answers) => {
                    let augmented = augment_raw_text(raw_text, answers);
                    match self
                        .generator
                        .intake(&augmented, policy_summary)
                        .await
                        .map_err(|source| OrchestratorError::IntakeFailed { source })?
                    {
                        IntakeOutcome::Ready(request) => request,
                        IntakeOutcome::NeedsClarification(questions) => {
                            return Ok(PipelineResult::needs_clarification(questions));
                        }
                    }
                }
            },
        };
        request.validate()?;

        let policy_result = self.policy.validate_request(&request);
        if !policy_result.valid() {
            return Err(OrchestratorError::PolicyBlocked {
                violations: policy_result.violations,
            });
        }

        let candidates = self
            .seed_catalog
            .load()
            .await
            .map_err(OrchestratorError::SeedCatalogUnavailable)?;

        let budget_per_unit = request.budget_per_unit();
        let mut ranked: Vec<(VendorProfile, VendorMatchSummary)> = candidates
            .into_iter()
            .map(|vendor| {
                let summary = self.matcher.evaluate_vendor_against_request(&request, &vendor, budget_per_unit, None);
                (vendor, summary)
            })
            .filter(|(_, summary)| summary.passes_shortlist_gate())
            .collect();
        ranked.sort_by(|a, b| b.1.composite_score.partial_cmp(&a.1.composite_score).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(top_n.max(1));

        if ranked.is_empty() {
            return Err(OrchestratorError::NoEligibleVendors);
        }

        let shortlist: Vec<ShortlistEntry> = ranked
            .iter()
            .map(|(vendor, summary)| ShortlistEntry {
                vendor_id: vendor.vendor_id.clone(),
                name: vendor.name.clone(),
                score: summary.composite_score,
                reasons: shortlist_reasons(summary),
            })
            .collect();

        let buyer_config = BuyerAgentConfig {
            buyer_accept_threshold: self.engine_config.thresholds.buyer_accept_threshold,
            lever_epsilon: self.engine_config.thresholds.lever_epsilon,
            proposal_retries: self.engine_config.proposal.proposal_retries,
            ..BuyerAgentConfig::default()
        };
        let buyer = Arc::new(BuyerAgent::new(
            self.policy.clone(),
            self.guardrail.clone(),
            self.generator.clone(),
            self.seller.clone(),
            self.audit.clone(),
            self.memory.clone(),
            buyer_config,
            self.rate_limiter.clone(),
            self.metrics.clone(),
        ));

        let cancellation = CancellationToken::new();
        let seasonal_month = Some(self.clock.current_month());

        let mut handles = Vec::with_capacity(ranked.len());
        for (vendor, summary) in ranked {
            let buyer = buyer.clone();
            let request = request.clone();
            let audit = self.audit.clone();
            let memory = self.memory.clone();
            let retrieval = self.retrieval.clone();
            let cancellation = cancellation.clone();
            let wall_clock = Duration::from_secs(
                vendor.exchange_policy.max_rounds as u64 * self.engine_config.negotiation.wall_clock_secs_per_round,
            );
            let scenario_tags = scenario_tags_for(&request, &vendor, &summary);
            let summary_for_fallback = summary.clone();

            handles.push(tokio::spawn(async move {
                let outcome = tokio::time::timeout(
                    wall_clock,
                    buyer.negotiate(&request, &vendor, summary, scenario_tags, seasonal_month, None, &cancellation),
                )
                .await;

                match outcome {
                    Ok(Ok(state)) => {
                        let memory_log = memory.export(&request.request_id, &vendor.vendor_id).await;
                        if let Some(entry) = memory_log.clone() {
                            retrieval.register_memory(entry).await;
                        }
                        let utility = state
                            .best_offer
                            .as_ref()
                            .and_then(|o| o.score.as_ref())
                            .map(|s| s.utility)
                            .unwrap_or(0.0);
                        let result = vendor_result_from_state(&vendor, &state, request.quantity, memory_log);
                        Some((result, utility, risk_score(&vendor)))
                    }
                    Ok(Err(AgentError::NoZopa { vendor_id, .. })) => {
                        audit
                            .record_event(AuditEvent {
                                name: "vendor.no_zopa".to_string(),
                                request_id: request.request_id.clone(),
                                vendor_id: Some(vendor_id.clone()),
                                timestamp: chrono::Utc::now(),
                                data: Default::default(),
                            })
                            .await;
                        memory
                            .finalize(&request.request_id, &vendor_id, NegotiationOutcome::Dropped, Decimal::ZERO)
                            .await;
                        let result = fallback_vendor_result(
                            &vendor,
                            &summary_for_fallback,
                            request.quantity,
                            NegotiationOutcome::Dropped,
                            "no_zopa",
                        );
                        Some((result, 0.0, risk_score(&vendor)))
                    }
                    Ok(Err(other)) => {
                        warn!(vendor_id = %vendor.vendor_id, error = %other, "vendor negotiation failed");
                        None
                    }
                    Err(_elapsed) => {
                        audit
                            .record_event(AuditEvent {
                                name: "vendor.timeout".to_string(),
                                request_id: request.request_id.clone(),
                                vendor_id: Some(vendor.vendor_id.clone()),
                                timestamp: chrono::Utc::now(),
                                data: Default::default(),
                            })
                            .await;
                        memory
                            .finalize(&request.request_id, &vendor.vendor_id, NegotiationOutcome::Stalemate, Decimal::ZERO)
                            .await;
                        let result = fallback_vendor_result(
                            &vendor,
                            &summary_for_fallback,
                            request.quantity,
                            NegotiationOutcome::Stalemate,
                            "timeout",
                        );
                        Some((result, 0.0, risk_score(&vendor)))
                    }
                }
            }));
        }

        let joined = futures::future::join_all(handles).await;
        let mut outcomes: Vec<(VendorResult, f64, f64)> = Vec::with_capacity(joined.len());
        for handle_result in joined {
            match handle_result {
                Ok(Some(outcome)) => outcomes.push(outcome),
                Ok(None) => {}
                Err(join_err) => warn!(error = %join_err, "vendor negotiation task panicked"),
            }
        }

        let bundles = build_presentation_bundles(&outcomes);
        let vendors: Vec<VendorResult> = outcomes.into_iter().map(|(result, _, _)| result).collect();

        let round_logs = self.audit.export_request(&request.request_id).await;
        let events = self.audit.export_events(&request.request_id).await;

        self.metrics.record_pipeline_run(
            started.elapsed().as_secs_f64() * 1000.0,
            &format!("{:?}", request.request_type),
            shortlist.len(),
        );

        Ok(PipelineResult {
            request: Some(request),
            clarification_questions: Vec::new(),
            shortlist,
            bundles,
            vendors,
            audit: AuditExport { round_logs, events },
        })
    }
}

fn augment_raw_text(raw_text: &str, answers: &BTreeMap<String, String>) -> String {
    let mut augmented = raw_text.to_string();
    for (field, answer) in answers {
        augmented.push_str(&format!("\n{field}: {answer}"));
    }
    augmented
}

fn quantity_bucket(quantity: u32) -> &'static str {
    match quantity {
        0..=24 => "small",
        25..=249 => "medium",
        _ => "large",
    }
}

fn budget_tightness(request: &Request, vendor: &VendorProfile) -> String {
    let budget_pu = request.budget_per_unit();
    let list_price = vendor.list_price(request.quantity);
    if list_price.is_zero() {
        return "unknown".to_string();
    }
    let ratio = (budget_pu / list_price).to_f64().unwrap_or(1.0);
    if ratio < 0.9 {
        "tight".to_string()
    } else if ratio < 1.1 {
        "moderate".to_string()
    } else {
        "loose".to_string()
    }
}

fn scenario_tags_for(request: &Request, vendor: &VendorProfile, summary: &VendorMatchSummary) -> ScenarioTags {
    ScenarioTags {
        category: Some(summary.inferred_category.clone()),
        quantity_bucket: Some(quantity_bucket(request.quantity).to_string()),
        must_have_tags: request.must_haves.iter().cloned().collect(),
        budget_tightness: Some(budget_tightness(request, vendor)),
    }
}

fn shortlist_reasons(summary: &VendorMatchSummary) -> Vec<String> {
    let mut reasons = vec![format!("category match: {}", summary.inferred_category)];
    if !summary.feature.matched.is_empty() {
        reasons.push(format!(
            "matches {} required feature(s): {}",
            summary.feature.matched.len(),
            summary.feature.matched.join(", ")
        ));
    }
    if summary.compliance.score >= 1.0 {
        reasons.push("meets all stated compliance requirements".to_string());
    } else if !summary.compliance.findings.is_empty() {
        reasons.push(format!("compliance score {:.2}", summary.compliance.score));
    }
    reasons.push(format!("composite score {:.2}", summary.composite_score));
    reasons
}

fn risk_score(vendor: &VendorProfile) -> f64 {
    match vendor.risk_level {
        RiskLevel::Low => 0.2,
        RiskLevel::Med => 0.5,
        RiskLevel::High => 0.8,
    }
}

fn default_payment_terms(vendor: &VendorProfile) -> PaymentTerms {
    vendor.guardrails.payment_terms_allowed.iter().next().copied().unwrap_or(PaymentTerms::Net30)
}

fn support_summary(vendor: &VendorProfile) -> SupportSummary {
    SupportSummary {
        support_tier: vendor.reliability_stats.support_tier.clone(),
        sla_pct: vendor.reliability_stats.sla_pct,
        response_window_hours: vendor.guardrails.response_window_hours,
    }
}

fn behavior_profile(vendor: &VendorProfile) -> String {
    format!("{:?} risk", vendor.risk_level)
}

fn vendor_result_from_state(
    vendor: &VendorProfile,
    state: &VendorNegotiationState,
    quantity: u32,
    memory_log: Option<NegotiationMemory>,
) -> VendorResult {
    let components = state.best_offer.as_ref().map(|o| o.components.clone());
    let outcome = memory_log.as_ref().and_then(|m| m.outcome).unwrap_or(NegotiationOutcome::Dropped);
    let savings = memory_log.as_ref().and_then(|m| m.savings).unwrap_or(Decimal::ZERO);

    VendorResult {
        vendor_id: vendor.vendor_id.clone(),
        vendor_name: vendor.name.clone(),
        final_price: components.as_ref().map(|c| c.unit_price).unwrap_or_else(|| vendor.list_price(quantity)),
        term_months: components.as_ref().map(|c| c.term_months).unwrap_or(12),
        payment_terms: components.as_ref().map(|c| c.payment_terms).unwrap_or_else(|| default_payment_terms(vendor)),
        compliance_status: state.match_summary.compliance.findings.clone(),
        support: support_summary(vendor),
        behavior_profile: behavior_profile(vendor),
        audit_summary: AuditSummary {
            rounds: state.round,
            outcome,
            outcome_reason: state.outcome_reason.clone(),
            savings,
        },
        memory_log,
    }
}

fn fallback_vendor_result(
    vendor: &VendorProfile,
    summary: &VendorMatchSummary,
    quantity: u32,
    outcome: NegotiationOutcome,
    reason: &str,
) -> VendorResult {
    VendorResult {
        vendor_id: vendor.vendor_id.clone(),
        vendor_name: vendor.name.clone(),
        final_price: vendor.list_price(quantity),
        term_months: 12,
        payment_terms: default_payment_terms(vendor),
        compliance_status: summary.compliance.findings.clone(),
        support: support_summary(vendor),
        behavior_profile: behavior_profile(vendor),
        audit_summary: AuditSummary {
            rounds: 0,
            outcome,
            outcome_reason: Some(reason.to_string()),
            savings: Decimal::ZERO,
        },
        memory_log: None,
    }
}

fn bundle_offer(result: &VendorResult, headline: &str) -> BundleOffer {
    BundleOffer {
        offer_id: format!("{}-{}", result.vendor_id, result.final_price),
        vendor_id: result.vendor_id.clone(),
        bullets: vec![
            headline.to_string(),
            format!("{} at {}/unit", result.vendor_name, result.final_price),
            format!("{} rounds, savings {}", result.audit_summary.rounds, result.audit_summary.savings),
        ],
    }
}

fn pick_unused(ranked: &[&(VendorResult, f64, f64)], used: &mut BTreeSet<String>, headline: &str) -> Option<BundleOffer> {
    let chosen = ranked.iter().find(|(result, _, _)| !used.contains(&result.vendor_id)).or_else(|| ranked.first())?;
    used.insert(chosen.0.vendor_id.clone());
    Some(bundle_offer(&chosen.0, headline))
}

/// §4.L step 5: ranks only accepted deals, deduplicating vendors across slots
/// unless too few vendors closed to fill every slot uniquely.
fn build_presentation_bundles(outcomes: &[(VendorResult, f64, f64)]) -> PresentationBundles {
    let accepted: Vec<&(VendorResult, f64, f64)> = outcomes
        .iter()
        .filter(|(result, _, _)| result.audit_summary.outcome == NegotiationOutcome::Accepted)
        .collect();

    if accepted.is_empty() {
        return PresentationBundles::default();
    }

    let mut by_value = accepted.clone();
    by_value.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let mut by_cost = accepted.clone();
    by_cost.sort_by(|a, b| a.0.final_price.cmp(&b.0.final_price));
    let mut by_risk = accepted;
    by_risk.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));

    let mut used = BTreeSet::new();
    let best_value = pick_unused(&by_value, &mut used, "best overall utility across price, features, and risk");
    let lowest_cost = pick_unused(&by_cost, &mut used, "lowest negotiated unit price");
    let lowest_risk = pick_unused(&by_risk, &mut used, "lowest vendor risk profile");

    PresentationBundles {
        best_value,
        lowest_cost,
        lowest_risk,
    }
}
