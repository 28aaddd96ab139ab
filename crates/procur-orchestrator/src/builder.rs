use std::sync::Arc;

use procur_agents::SellerAgent;
use procur_audit::{AuditTrail, MemoryStore, RetrievalIndex};
use procur_config::EngineConfig;
use procur_evaluation::feature::SynonymMap;
use procur_matching::matcher::{MatchWeights, VendorMatcher};
use procur_metrics::MetricsCollector;
use procur_policy::{GuardrailConfig, GuardrailService, PolicyEngine, PolicyEngineConfig};
use procur_proposal::ProposalGenerator;
use procur_ratelimit::{RateLimiter, RateLimiterConfig};

use crate::clock::{Clock, SystemClock};
use crate::pipeline::Pipeline;
use crate::seed::SeedCatalog;

#[derive(Debug, thiserror::Error)]
pub enum BuilderError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
}

/// Builds a `Pipeline` from its required collaborators (the proposal generator
/// and the seed catalog, both host-provided per §6) plus an `EngineConfig`
/// that every other collaborator is derived from when not supplied explicitly.
#[derive(Default)]
pub struct PipelineBuilder {
    engine_config: Option<EngineConfig>,
    generator: Option<Arc<dyn ProposalGenerator>>,
    seed_catalog: Option<Arc<dyn SeedCatalog>>,
    scoring_weights: Option<MatchWeights>,
    synonyms: Option<SynonymMap>,
    clock: Option<Arc<dyn Clock>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine_config(mut self, config: EngineConfig) -> Self {
        self.engine_config = Some(config);
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn ProposalGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_seed_catalog(mut self, catalog: Arc<dyn SeedCatalog>) -> Self {
        self.seed_catalog = Some(catalog);
        self
    }

    pub fn with_scoring_weights(mut self, weights: MatchWeights) -> Self {
        self.scoring_weights = Some(weights);
        self
    }

    pub fn with_synonyms(mut self, synonyms: SynonymMap) -> Self {
        self.synonyms = Some(synonyms);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<Pipeline, BuilderError> {
        let generator = self.generator.ok_or(BuilderError::MissingField { field: "generator" })?;
        let seed_catalog = self
            .seed_catalog
            .ok_or(BuilderError::MissingField { field: "seed_catalog" })?;
        let engine_config = self.engine_config.unwrap_or_default();

        let policy = PolicyEngine::new(PolicyEngineConfig {
            budget_cap_overrun_multiplier: 1.05,
            default_risk_threshold: 0.7,
        });
        let guardrail = GuardrailService::new(GuardrailConfig {
            price_outlier_threshold: engine_config.thresholds.price_outlier_threshold,
            run_mode: engine_config.run_mode,
        });
        let matcher = VendorMatcher::new(self.synonyms.unwrap_or_default(), self.scoring_weights.unwrap_or_default());
        let seller = SellerAgent::new(policy.clone(), guardrail.clone());
        let rate_limiter = Arc::new(RateLimiter::new(RateLimiterConfig {
            capacity: engine_config.rate_limit.rate_limit_capacity,
            refill_per_sec: engine_config.rate_limit.rate_limit_refill_per_sec,
            max_wait: std::time::Duration::from_secs(engine_config.proposal.proposal_timeout_secs),
        }));

        Ok(Pipeline::new(
            engine_config,
            policy,
            guardrail,
            seller,
            matcher,
            generator,
            seed_catalog,
            Arc::new(AuditTrail::new()),
            Arc::new(MemoryStore::new()),
            Arc::new(RetrievalIndex::new()),
            Arc::new(MetricsCollector::new()),
            rate_limiter,
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        ))
    }
}
