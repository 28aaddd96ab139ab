use std::collections::BTreeSet;
use std::sync::Arc;

use procur_audit::{AuditTrail, MemoryStore};
use procur_metrics::MetricsCollector;
use procur_evaluation::tco::compute_tco;
use procur_evaluation::utility::compute_buyer_utility;
use procur_negotiation::{
    choose_lever_epsilon_greedy, detect_stalemate, enforce_exchange_requirements, enforce_monotonic_progress,
    enforce_offer_diversity, generate_seed_bundles, generate_target_bundle, select_buyer_strategy, should_close_deal,
    CloseInputs, StrategyContext, DEFAULT_MAX_STALLED_ROUNDS,
};
use procur_policy::{GuardrailService, PolicyEngine};
use procur_proposal::{synthetic_message, ProposalGenerator};
use procur_ratelimit::RateLimiter;
use procur_types::{
    ActorRole, AuditEvent, BuyerStrategy, CandidateEvaluation, FsmState, Lever, MoveLog, NegotiationDecision,
    NegotiationMessage, NegotiationOutcome, NegotiationPlan, Offer, OfferComponents, OfferScore, OpponentModel,
    Request, RoundMemory, ScenarioTags, UtilitySnapshot, VendorMatchSummary, VendorNegotiationState, VendorProfile,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::AgentError;
use crate::seller::SellerAgent;

/// Tunables the buyer-agent loop needs beyond what `ExchangePolicy` already
/// carries; owned as an instance field rather than a module constant (§9).
#[derive(Debug, Clone, Copy)]
pub struct BuyerAgentConfig {
    pub buyer_accept_threshold: f64,
    pub stop_risk: f64,
    pub lever_epsilon: f64,
    pub proposal_retries: u32,
}

impl Default for BuyerAgentConfig {
    fn default() -> Self {
        Self {
            buyer_accept_threshold: 0.75,
            stop_risk: 0.5,
            lever_epsilon: 0.10,
            proposal_retries: 2,
        }
    }
}

fn risk_score(vendor: &VendorProfile) -> f64 {
    match vendor.risk_level {
        procur_types::RiskLevel::Low => 0.2,
        procur_types::RiskLevel::Med => 0.5,
        procur_types::RiskLevel::High => 0.8,
    }
}

fn to_offer(request_id: &str, vendor_id: &str, components: OfferComponents, score: OfferScore) -> Offer {
    Offer {
        offer_id: format!("{request_id}-{vendor_id}-{}", components.unit_price),
        request_id: request_id.to_string(),
        vendor_id: vendor_id.to_string(),
        components,
        score: Some(score),
        confidence: None,
        accepted: false,
    }
}

/// Drives one vendor's full negotiation: seed bundle, per-round proposal
/// generation, exchange/policy/guardrail enforcement, seller counter, close
/// decision, and finalization (§4.H).
pub struct BuyerAgent {
    policy: PolicyEngine,
    guardrail: GuardrailService,
    generator: Arc<dyn ProposalGenerator>,
    seller: SellerAgent,
    audit: Arc<AuditTrail>,
    memory: Arc<MemoryStore>,
    config: BuyerAgentConfig,
    rate_limiter: Arc<RateLimiter>,
    metrics: Arc<MetricsCollector>,
}

impl BuyerAgent {
    pub fn new(
        policy: PolicyEngine,
        guardrail: GuardrailService,
        generator: Arc<dyn ProposalGenerator>,
        seller: SellerAgent,
        audit: Arc<AuditTrail>,
        memory: Arc<MemoryStore>,
        config: BuyerAgentConfig,
        rate_limiter: Arc<RateLimiter>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            policy,
            guardrail,
            generator,
            seller,
            audit,
            memory,
            config,
            rate_limiter,
            metrics,
        }
    }

    fn seed_plan(&self, vendor: &VendorProfile, anchor_price: Decimal) -> NegotiationPlan {
        NegotiationPlan {
            anchors: std::collections::BTreeMap::from([("price".to_string(), anchor_price.to_f64().unwrap_or(0.0))]),
            concession_ladder: vec![Lever::Price, Lever::Term, Lever::Payment, Lever::Value],
            stop_utility: self.config.buyer_accept_threshold,
            stop_risk: self.config.stop_risk,
            allowed_concessions: vec![Lever::Price, Lever::Term, Lever::Payment, Lever::Value],
            current_strategy: BuyerStrategy::PriceAnchor,
            exchange_policy: vendor.exchange_policy.clone(),
        }
    }

    /// §4.H: runs the full per-vendor loop, returning the finalized negotiation
    /// state. `scenario_tags` feeds the memory store's retrieval index.
    pub async fn negotiate(
        &self,
        request: &Request,
        vendor: &VendorProfile,
        match_summary: VendorMatchSummary,
        scenario_tags: ScenarioTags,
        seasonal_month: Option<u32>,
        competitive: Option<&procur_types::CompetitiveContext>,
        cancellation: &CancellationToken,
    ) -> Result<VendorNegotiationState, AgentError> {
        let list_price = vendor.list_price(request.quantity);
        let floor_price = vendor.guardrails.price_floor;
        let budget_pu = request.budget_per_unit();

        let seed_bundles = generate_seed_bundles(
            list_price,
            floor_price,
            budget_pu,
            request.budget_max,
            request.quantity,
            &vendor.exchange_policy,
        );
        let Some(first_bundle) = seed_bundles.into_iter().next() else {
            return Err(AgentError::NoZopa {
                vendor_id: vendor.vendor_id.clone(),
                floor: floor_price,
            });
        };

        let opponent_model = OpponentModel::seed(floor_price, first_bundle.unit_price);
        let plan = self.seed_plan(vendor, first_bundle.unit_price);

        let mut state = VendorNegotiationState {
            vendor: vendor.clone(),
            round: 0,
            best_offer: None,
            active: true,
            concession_index: 0,
            history: Vec::new(),
            opponent_model,
            stalemate_rounds: 0,
            plan,
            fsm_state: FsmState::Init,
            outcome_reason: None,
            concession_notes: Vec::new(),
            match_summary,
            competing_offers: Vec::new(),
        };

        self.audit
            .record_event(AuditEvent {
                name: "vendor.negotiation_started".to_string(),
                request_id: request.request_id.clone(),
                vendor_id: Some(vendor.vendor_id.clone()),
                timestamp: chrono::Utc::now(),
                data: Default::default(),
            })
            .await;
        self.metrics.record_negotiation_started();

        let mut chosen_bundle = first_bundle;
        state.fsm_state = FsmState::Negotiating;

        let max_rounds = state.plan.exchange_policy.max_rounds;
        'rounds: for round in 1..=max_rounds {
            if cancellation.is_cancelled() {
                state.fsm_state = FsmState::Dropped;
                state.outcome_reason = Some("cancelled".to_string());
                state.active = false;
                warn!(request_id = %request.request_id, vendor_id = %vendor.vendor_id, round, "negotiation cancelled at round boundary");
                break 'rounds;
            }
            state.round = round;

            let compliance_notes: Vec<String> = state
                .match_summary
                .compliance
                .findings
                .iter()
                .filter(|f| f.blocking)
                .map(|f| format!("{} missing and blocking", f.framework))
                .collect();

            let excluded: BTreeSet<Lever> = state
                .plan
                .concession_ladder
                .iter()
                .take(state.concession_index)
                .copied()
                .collect();
            let ladder_lever = choose_lever_epsilon_greedy(
                &request.request_id,
                &vendor.vendor_id,
                round,
                list_price,
                request.quantity,
                &vendor.exchange_policy,
                &excluded,
                self.config.lever_epsilon,
            );

            let stalemate_detected = detect_stalemate(
                &state
                    .history
                    .iter()
                    .step_by(2)
                    .cloned()
                    .collect::<Vec<_>>(),
            );

            let strategy_ctx = StrategyContext {
                round,
                stalemate_rounds: state.stalemate_rounds,
                max_stalled_rounds: DEFAULT_MAX_STALLED_ROUNDS,
                current_best_price: state
                    .last_buyer_offer()
                    .map(|o| o.components.unit_price)
                    .unwrap_or(chosen_bundle.unit_price),
                competing_offers: &state.competing_offers,
                opponent_model: &state.opponent_model,
                last_payment_terms: state.last_seller_offer().map(|o| o.components.payment_terms),
                stalemate_detected,
                next_ladder_lever: ladder_lever,
            };
            let strategy = select_buyer_strategy(strategy_ctx);
            state.plan.current_strategy = strategy;
            self.metrics.record_round(strategy);

            if round > 1 {
                chosen_bundle = generate_target_bundle(
                    strategy,
                    list_price,
                    floor_price,
                    budget_pu,
                    request.quantity,
                    state
                        .last_buyer_offer()
                        .map(|o| o.components.term_months)
                        .unwrap_or(12),
                    state.opponent_model.price_floor_estimate,
                    &vendor.exchange_policy,
                );
                enforce_offer_diversity(
                    &mut chosen_bundle,
                    state.last_seller_offer().map(|o| &o.components),
                    floor_price,
                );
            }

            let mut message = self.propose_with_retries(request, &state, strategy, &chosen_bundle, round).await?;
            message.proposal.quantity = request.quantity;
            message.proposal.currency = request.currency.clone();
            enforce_monotonic_progress(&mut message.proposal, state.last_buyer_offer().map(|o| &o.components));
            if let Some(previous) = state.last_seller_offer() {
                enforce_exchange_requirements(&previous.components, &mut message.proposal, floor_price, &vendor.exchange_policy);
            }

            let mut policy_result = self.policy.validate_offer(request, &message.proposal, Some(vendor), true);
            let mut guardrail_alerts = self.guardrail.evaluate(request, vendor, &message.proposal);
            let mut notes = Vec::new();
            if !policy_result.valid() || guardrail_alerts.iter().any(|alert| alert.blocking) {
                message.proposal = chosen_bundle.clone();
                notes.push("policy_adjustment".to_string());
                policy_result = self.policy.validate_offer(request, &message.proposal, Some(vendor), true);
                guardrail_alerts = self.guardrail.evaluate(request, vendor, &message.proposal);
            }
            for violation in &policy_result.violations {
                self.metrics.record_policy_violation(&violation.code, violation.blocking);
            }
            for alert in &guardrail_alerts {
                self.metrics.record_guardrail_alert(&alert.code, alert.blocking);
            }

            let buyer_tco = compute_tco(&message.proposal, None).ok();
            let buyer_utility = compute_buyer_utility(
                message.proposal.unit_price,
                budget_pu,
                state.match_summary.feature.score,
                state.match_summary.compliance.score,
                state.match_summary.sla_score,
                Default::default(),
            );
            let buyer_score = OfferScore {
                spec_match: state.match_summary.feature.score,
                tco_norm: 0.0,
                risk: risk_score(vendor),
                time: state.match_summary.sla_score,
                utility: buyer_utility,
                matched_features: state.match_summary.feature.matched.clone(),
                missing_features: state.match_summary.feature.missing.clone(),
            };
            let buyer_offer = to_offer(&request.request_id, &vendor.vendor_id, message.proposal.clone(), buyer_score.clone());

            self.audit
                .record_move(
                    &request.request_id,
                    &vendor.vendor_id,
                    MoveLog {
                        actor: ActorRole::Buyer,
                        round_number: round,
                        offer: buyer_offer.components.clone(),
                        lever: ladder_lever,
                        rationale: message.justification_bullets.clone(),
                        utility: UtilitySnapshot {
                            buyer_utility,
                            seller_utility: None,
                            tco: buyer_tco.map(|b| b.total).unwrap_or_default(),
                        },
                        decision: Some(NegotiationDecision::Counter),
                        timestamp: chrono::Utc::now(),
                        policy_notes: notes.clone(),
                        guardrail_notes: guardrail_alerts.iter().map(|a| a.message.clone()).chain(compliance_notes.clone()).collect(),
                        compliance_notes: compliance_notes.clone(),
                    },
                )
                .await;
            self.memory
                .add_round(
                    &request.request_id,
                    &vendor.vendor_id,
                    scenario_tags.clone(),
                    RoundMemory {
                        request_id: request.request_id.clone(),
                        vendor_id: vendor.vendor_id.clone(),
                        round_number: round,
                        timestamp: chrono::Utc::now(),
                        actor: ActorRole::Buyer,
                        strategy: format!("{strategy:?}"),
                        selected: CandidateEvaluation {
                            offer: buyer_offer.clone(),
                            primary_lever: ladder_lever.unwrap_or(Lever::Price),
                            tco: buyer_tco.map(|b| b.total).unwrap_or_default(),
                            buyer_utility,
                            seller_utility: None,
                            valid: policy_result.valid(),
                            policy_violations: policy_result.violations.clone(),
                            guardrail_alerts: guardrail_alerts.clone(),
                            rationale: message.justification_bullets.join("; "),
                        },
                        rejected: Vec::new(),
                        decision: NegotiationDecision::Counter,
                        delta_utility: state
                            .best_offer
                            .as_ref()
                            .and_then(|o| o.score.as_ref())
                            .map(|prev| buyer_utility - prev.utility)
                            .unwrap_or(0.0),
                        delta_tco: Decimal::ZERO,
                    },
                )
                .await;
            state.history.push(buyer_offer.clone());

            let seller_counter = self.seller.counter(request, vendor, &message.proposal, &state, seasonal_month, competitive);
            let seller_tco = compute_tco(&seller_counter.offer, None).ok();
            let seller_score = OfferScore {
                spec_match: state.match_summary.feature.score,
                tco_norm: 0.0,
                risk: risk_score(vendor),
                time: state.match_summary.sla_score,
                utility: seller_counter.seller_utility,
                matched_features: Vec::new(),
                missing_features: Vec::new(),
            };
            let seller_offer = to_offer(&request.request_id, &vendor.vendor_id, seller_counter.offer.clone(), seller_score);
            state.opponent_model.record_move(&seller_counter.offer);

            self.audit
                .record_move(
                    &request.request_id,
                    &vendor.vendor_id,
                    MoveLog {
                        actor: ActorRole::Seller,
                        round_number: round,
                        offer: seller_offer.components.clone(),
                        lever: None,
                        rationale: vec![format!("{:?}", seller_counter.strategy)],
                        utility: UtilitySnapshot {
                            buyer_utility,
                            seller_utility: Some(seller_counter.seller_utility),
                            tco: seller_tco.map(|b| b.total).unwrap_or_default(),
                        },
                        decision: Some(NegotiationDecision::Counter),
                        timestamp: chrono::Utc::now(),
                        policy_notes: Vec::new(),
                        guardrail_notes: seller_counter.guardrail_alerts.iter().map(|a| a.message.clone()).collect(),
                        compliance_notes: Vec::new(),
                    },
                )
                .await;
            state.history.push(seller_offer.clone());

            if buyer_offer.score.as_ref().map(|s| s.utility).unwrap_or(0.0) >= state.best_offer.as_ref().and_then(|o| o.score.as_ref()).map(|s| s.utility).unwrap_or(0.0) {
                state.best_offer = Some(seller_offer.clone());
            }

            let risk = risk_score(vendor);
            if strategy != BuyerStrategy::PriceAnchor {
                state.concession_index = (state.concession_index + 1).min(state.plan.concession_ladder.len());
            }
            let ladder_exhausted = state.concession_index >= state.plan.concession_ladder.len() && stalemate_detected;

            let decision = if buyer_utility >= state.plan.stop_utility && risk <= state.plan.stop_risk {
                NegotiationDecision::Accept
            } else if ladder_exhausted {
                NegotiationDecision::Drop
            } else {
                NegotiationDecision::Counter
            };

            let close_inputs = CloseInputs {
                tco: seller_tco.map(|b| b.total).unwrap_or_default(),
                budget_max: request.budget_max,
                buyer_utility,
                seller_utility: seller_counter.seller_utility,
                policy_result: &seller_counter.policy_result,
                price: seller_counter.offer.unit_price,
                vendor_floor: floor_price,
                previous_opponent_offer: state.opponent_model.last_offers().iter().rev().nth(1).map(|o| o.unit_price),
                latest_opponent_offer: state.opponent_model.last_offers().back().map(|o| o.unit_price),
                finalize_gap_abs: vendor.exchange_policy.finalize_gap_abs,
                finalize_gap_pct: vendor.exchange_policy.finalize_gap_pct,
            };
            let close_reason = should_close_deal(&close_inputs);

            state.stalemate_rounds = if stalemate_detected { state.stalemate_rounds + 1 } else { 0 };

            if close_reason.is_some() || decision == NegotiationDecision::Accept {
                state.fsm_state = FsmState::Accepted;
                state.outcome_reason = Some(format!("{:?}", close_reason.unwrap_or(procur_negotiation::CloseReason::ThresholdsMetOutright)));
                state.best_offer = Some(seller_offer);
                state.active = false;
                info!(request_id = %request.request_id, vendor_id = %vendor.vendor_id, round, "negotiation accepted");
                break 'rounds;
            }
            if decision == NegotiationDecision::Drop {
                state.fsm_state = FsmState::Dropped;
                state.outcome_reason = Some("concession_ladder_exhausted".to_string());
                state.active = false;
                warn!(request_id = %request.request_id, vendor_id = %vendor.vendor_id, round, "negotiation dropped");
                break 'rounds;
            }
        }

        if state.active {
            state.fsm_state = FsmState::Dropped;
            state.outcome_reason = Some("round_bound_exhausted".to_string());
            state.active = false;
        }

        let outcome = match state.fsm_state {
            FsmState::Accepted => NegotiationOutcome::Accepted,
            _ if state.stalemate_rounds >= DEFAULT_MAX_STALLED_ROUNDS => NegotiationOutcome::Stalemate,
            _ => NegotiationOutcome::Dropped,
        };
        let savings = state
            .best_offer
            .as_ref()
            .map(|offer| ((list_price - offer.components.unit_price) * Decimal::from(request.quantity)).max(Decimal::ZERO))
            .unwrap_or(Decimal::ZERO);
        self.memory.finalize(&request.request_id, &vendor.vendor_id, outcome, savings).await;
        self.audit
            .record_event(AuditEvent {
                name: "vendor.negotiation_finalized".to_string(),
                request_id: request.request_id.clone(),
                vendor_id: Some(vendor.vendor_id.clone()),
                timestamp: chrono::Utc::now(),
                data: Default::default(),
            })
            .await;
        self.metrics.record_negotiation_finalized(outcome, state.outcome_reason.as_deref().unwrap_or("unknown"));

        Ok(state)
    }

    async fn propose_with_retries(
        &self,
        request: &Request,
        state: &VendorNegotiationState,
        strategy: BuyerStrategy,
        chosen_bundle: &OfferComponents,
        round: u32,
    ) -> Result<NegotiationMessage, AgentError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            if let Err(err) = self.rate_limiter.acquire().await {
                if attempts <= self.config.proposal_retries {
                    self.metrics.record_proposal_generator_retry(attempts);
                    warn!(vendor_id = %state.vendor.vendor_id, round, attempts, error = %err, "rate limiter rejected proposal call, retrying");
                    continue;
                }
                self.metrics.record_proposal_generator_failure();
                warn!(vendor_id = %state.vendor.vendor_id, round, attempts, error = %err, "rate limiter exhausted, falling back to deterministic bundle");
                return Ok(synthetic_message(ActorRole::Buyer, strategy, chosen_bundle.clone(), round));
            }
            let started = std::time::Instant::now();
            match self.generator.propose(request, state, strategy, chosen_bundle, round).await {
                Ok(message) => {
                    self.metrics.record_proposal_generator_call(started.elapsed().as_secs_f64() * 1000.0);
                    return Ok(message);
                }
                Err(err) if attempts <= self.config.proposal_retries => {
                    self.metrics.record_proposal_generator_retry(attempts);
                    warn!(vendor_id = %state.vendor.vendor_id, round, attempts, error = %err, "proposal generator call failed, retrying");
                    continue;
                }
                Err(_) => {
                    self.metrics.record_proposal_generator_failure();
                    return Ok(synthetic_message(ActorRole::Buyer, strategy, chosen_bundle.clone(), round));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procur_matching::matcher::{MatchWeights, VendorMatcher};
    use procur_policy::{GuardrailConfig, PolicyEngineConfig};
    use procur_proposal::DeterministicProposalGenerator;
    use procur_ratelimit::RateLimiterConfig;
    use procur_types::{
        ExchangePolicy, PaymentTerms, ReliabilityStats, RequestLifecycleState, RequestPolicyContext, RequestType,
        RiskLevel, VendorGuardrails,
    };
    use std::collections::{BTreeMap, BTreeSet};

    fn vendor() -> VendorProfile {
        VendorProfile {
            vendor_id: "vendor-1".to_string(),
            name: "Acme".to_string(),
            category: Some("crm".to_string()),
            capability_tags: BTreeSet::new(),
            certifications: BTreeSet::new(),
            regions: BTreeSet::new(),
            price_tiers: BTreeMap::from([(1, Decimal::new(130, 0))]),
            guardrails: VendorGuardrails {
                price_floor: Decimal::new(90, 0),
                non_negotiables: BTreeSet::new(),
                payment_terms_allowed: BTreeSet::from([PaymentTerms::Net30]),
                response_window_hours: 24,
                contact_endpoints: BTreeSet::new(),
            },
            exchange_policy: ExchangePolicy {
                term_trade: BTreeMap::from([(12, 0.05), (24, 0.08)]),
                payment_trade: BTreeMap::from([(PaymentTerms::Net15, -0.02)]),
                value_add_offsets: BTreeMap::new(),
                min_step_abs: Decimal::new(1, 0),
                finalize_gap_abs: Decimal::new(10, 0),
                finalize_gap_pct: 0.02,
                close_extra_discount: 0.01,
                max_rounds: 6,
            },
            reliability_stats: ReliabilityStats {
                on_time_delivery_pct: Some(0.97),
                support_tier: Some("gold".to_string()),
                sla_pct: Some(0.995),
            },
            risk_level: RiskLevel::Low,
            billing_cadence: None,
        }
    }

    fn request() -> Request {
        Request {
            request_id: "req-1".to_string(),
            requester_id: "buyer-1".to_string(),
            request_type: RequestType::Saas,
            description: "sales pipeline and lead management tool".to_string(),
            specs: BTreeMap::new(),
            quantity: 20,
            budget_min: None,
            budget_max: Some(Decimal::new(2_200, 0)),
            currency: "USD".to_string(),
            must_haves: BTreeSet::new(),
            nice_to_haves: BTreeSet::new(),
            compliance_requirements: BTreeSet::new(),
            billing_cadence: None,
            policy_context: RequestPolicyContext::default(),
            status: RequestLifecycleState::Active,
        }
    }

    fn agent() -> BuyerAgent {
        let policy = PolicyEngine::new(PolicyEngineConfig {
            budget_cap_overrun_multiplier: 1.05,
            default_risk_threshold: 0.7,
        });
        let guardrail = GuardrailService::new(GuardrailConfig {
            price_outlier_threshold: 0.30,
            run_mode: procur_types::RunMode::Simulation,
        });
        let seller = SellerAgent::new(policy.clone(), guardrail.clone());
        let generator: Arc<dyn ProposalGenerator> = Arc::new(DeterministicProposalGenerator);
        let rate_limiter = Arc::new(RateLimiter::new(RateLimiterConfig {
            capacity: 10,
            refill_per_sec: 5,
            max_wait: std::time::Duration::from_secs(5),
        }));
        BuyerAgent::new(
            policy,
            guardrail,
            generator,
            seller,
            Arc::new(AuditTrail::new()),
            Arc::new(MemoryStore::new()),
            BuyerAgentConfig::default(),
            rate_limiter,
            Arc::new(MetricsCollector::new()),
        )
    }

    fn match_summary(request: &Request, vendor: &VendorProfile) -> VendorMatchSummary {
        let matcher = VendorMatcher::new(Default::default(), MatchWeights::default());
        matcher.evaluate_vendor_against_request(request, vendor, request.budget_per_unit(), None)
    }

    #[tokio::test]
    async fn negotiate_reaches_a_terminal_state_within_the_round_bound() {
        let agent = agent();
        let vendor = vendor();
        let request = request();
        let summary = match_summary(&request, &vendor);
        let cancellation = CancellationToken::new();

        let state = agent
            .negotiate(&request, &vendor, summary, ScenarioTags::default(), Some(6), None, &cancellation)
            .await
            .expect("a feasible seed bundle exists above the vendor floor");

        assert!(!state.active);
        assert!(state.round <= vendor.exchange_policy.max_rounds);
        assert!(state.outcome_reason.is_some());
    }

    #[tokio::test]
    async fn cancellation_drops_the_negotiation_at_the_next_round_boundary() {
        let agent = agent();
        let vendor = vendor();
        let request = request();
        let summary = match_summary(&request, &vendor);
        let cancellation = CancellationToken::new();
        cancellation.cancel();

        let state = agent
            .negotiate(&request, &vendor, summary, ScenarioTags::default(), Some(6), None, &cancellation)
            .await
            .expect("cancellation is handled inside the loop, not surfaced as an error");

        assert_eq!(state.fsm_state, FsmState::Dropped);
        assert_eq!(state.outcome_reason.as_deref(), Some("cancelled"));
        assert_eq!(state.round, 0);
    }
}
