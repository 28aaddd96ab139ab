//! Core configuration structures for the procurement negotiation engine.

use procur_types::RunMode;
use serde::{Deserialize, Serialize};

/// Every tunable named in §6, layered from compiled-in defaults through an
/// optional file and `PROCUR_`-prefixed environment variables. No component
/// reads these values from a global; each receives what it needs through its
/// constructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub thresholds: ThresholdConfig,
    pub scoring: ScoringConfig,
    pub negotiation: NegotiationConfig,
    pub proposal: ProposalConfig,
    pub rate_limit: RateLimitConfig,
    #[serde(default = "default_run_mode")]
    pub run_mode: RunMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdConfig::default(),
            scoring: ScoringConfig::default(),
            negotiation: NegotiationConfig::default(),
            proposal: ProposalConfig::default(),
            rate_limit: RateLimitConfig::default(),
            run_mode: default_run_mode(),
        }
    }
}

fn default_run_mode() -> RunMode {
    RunMode::Simulation
}

/// Close-decision and stalemate thresholds (§4.F, §4.G).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_buyer_accept_threshold")]
    pub buyer_accept_threshold: f64,
    #[serde(default = "default_seller_accept_threshold")]
    pub seller_accept_threshold: f64,
    #[serde(default = "default_max_stalled_rounds")]
    pub max_stalled_rounds: u32,
    #[serde(default = "default_price_outlier_threshold")]
    pub price_outlier_threshold: f64,
    #[serde(default = "default_discount_rate")]
    pub discount_rate: f64,
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    #[serde(default = "default_lever_epsilon")]
    pub lever_epsilon: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            buyer_accept_threshold: default_buyer_accept_threshold(),
            seller_accept_threshold: default_seller_accept_threshold(),
            max_stalled_rounds: default_max_stalled_rounds(),
            price_outlier_threshold: default_price_outlier_threshold(),
            discount_rate: default_discount_rate(),
            max_rounds: default_max_rounds(),
            lever_epsilon: default_lever_epsilon(),
        }
    }
}

/// Composite-score weights for matching and offer scoring (§4.E).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_value_weight")]
    pub value: f64,
    #[serde(default = "default_cost_weight")]
    pub cost: f64,
    #[serde(default = "default_risk_weight")]
    pub risk: f64,
    #[serde(default = "default_time_weight")]
    pub time: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            value: default_value_weight(),
            cost: default_cost_weight(),
            risk: default_risk_weight(),
            time: default_time_weight(),
        }
    }
}

/// Concurrency shape for the orchestrator's per-vendor fan-out (§5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NegotiationConfig {
    /// `None` means one worker per shortlisted vendor (the spec's default).
    #[serde(default)]
    pub max_concurrent_workers: Option<usize>,
    #[serde(default = "default_wall_clock_secs_per_round")]
    pub wall_clock_secs_per_round: u64,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            max_concurrent_workers: None,
            wall_clock_secs_per_round: default_wall_clock_secs_per_round(),
        }
    }
}

/// Proposal-generator call policy (§5): timeout, retries, exponential backoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalConfig {
    #[serde(default = "default_proposal_timeout_secs")]
    pub proposal_timeout_secs: u64,
    #[serde(default = "default_proposal_retries")]
    pub proposal_retries: u32,
    #[serde(default = "default_proposal_backoff_base_secs")]
    pub proposal_backoff_base_secs: u64,
}

impl Default for ProposalConfig {
    fn default() -> Self {
        Self {
            proposal_timeout_secs: default_proposal_timeout_secs(),
            proposal_retries: default_proposal_retries(),
            proposal_backoff_base_secs: default_proposal_backoff_base_secs(),
        }
    }
}

/// Token-bucket sizing for the proposal-generator rate limiter (§4.Q).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_capacity")]
    pub rate_limit_capacity: u32,
    #[serde(default = "default_rate_limit_refill_per_sec")]
    pub rate_limit_refill_per_sec: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            rate_limit_capacity: default_rate_limit_capacity(),
            rate_limit_refill_per_sec: default_rate_limit_refill_per_sec(),
        }
    }
}

fn default_buyer_accept_threshold() -> f64 {
    0.75
}

fn default_seller_accept_threshold() -> f64 {
    0.10
}

fn default_max_stalled_rounds() -> u32 {
    3
}

fn default_price_outlier_threshold() -> f64 {
    0.30
}

fn default_discount_rate() -> f64 {
    0.12
}

fn default_max_rounds() -> u32 {
    8
}

fn default_lever_epsilon() -> f64 {
    0.10
}

fn default_value_weight() -> f64 {
    0.40
}

fn default_cost_weight() -> f64 {
    0.30
}

fn default_risk_weight() -> f64 {
    0.20
}

fn default_time_weight() -> f64 {
    0.10
}

fn default_wall_clock_secs_per_round() -> u64 {
    90
}

fn default_proposal_timeout_secs() -> u64 {
    60
}

fn default_proposal_retries() -> u32 {
    3
}

fn default_proposal_backoff_base_secs() -> u64 {
    1
}

fn default_rate_limit_capacity() -> u32 {
    10
}

fn default_rate_limit_refill_per_sec() -> u32 {
    5
}
