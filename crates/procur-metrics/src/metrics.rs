use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter, register_int_counter_vec,
    register_int_gauge, Histogram, HistogramVec, IntCounter, IntCounterVec, IntGauge,
};

lazy_static! {
    // ═══════════════════════════════════════════════════════════════════════════
    // NEGOTIATION METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Total number of vendor negotiations started
    pub static ref NEGOTIATIONS_STARTED: IntCounter = register_int_counter!(
        "procur_negotiations_started_total",
        "Total number of vendor negotiations started"
    )
    .unwrap();

    /// Total number of vendor negotiations that ended accepted
    pub static ref NEGOTIATIONS_ACCEPTED: IntCounter = register_int_counter!(
        "procur_negotiations_accepted_total",
        "Total number of vendor negotiations accepted"
    )
    .unwrap();

    /// Total number of vendor negotiations that ended dropped
    pub static ref NEGOTIATIONS_DROPPED: IntCounter = register_int_counter!(
        "procur_negotiations_dropped_total",
        "Total number of vendor negotiations dropped"
    )
    .unwrap();

    /// Total number of vendor negotiations that ended in stalemate
    pub static ref NEGOTIATIONS_STALEMATE: IntCounter = register_int_counter!(
        "procur_negotiations_stalemate_total",
        "Total number of vendor negotiations ending in stalemate"
    )
    .unwrap();

    /// Current number of negotiations in flight
    pub static ref ACTIVE_NEGOTIATIONS: IntGauge = register_int_gauge!(
        "procur_negotiations_active",
        "Current number of in-flight vendor negotiations"
    )
    .unwrap();

    /// Negotiation outcome counter by reason
    pub static ref NEGOTIATION_OUTCOME_REASON: IntCounterVec = register_int_counter_vec!(
        "procur_negotiation_outcome_reason_total",
        "Total negotiations by terminal outcome reason",
        &["reason"]
    )
    .unwrap();

    // ═══════════════════════════════════════════════════════════════════════════
    // ROUND METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Total number of negotiation rounds executed across all vendors
    pub static ref ROUNDS_EXECUTED: IntCounter = register_int_counter!(
        "procur_rounds_executed_total",
        "Total number of negotiation rounds executed"
    )
    .unwrap();

    /// Rounds executed per vendor strategy
    pub static ref ROUNDS_BY_STRATEGY: IntCounterVec = register_int_counter_vec!(
        "procur_rounds_by_strategy_total",
        "Total rounds by buyer strategy",
        &["strategy"]
    )
    .unwrap();

    // ═══════════════════════════════════════════════════════════════════════════
    // PROPOSAL GENERATOR METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Proposal-generator call latency histogram (milliseconds)
    pub static ref PROPOSAL_GENERATOR_LATENCY: Histogram = register_histogram!(
        "procur_proposal_generator_latency_ms",
        "Proposal generator call latency in milliseconds",
        vec![10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 5000.0, 30000.0, 60000.0]
    )
    .unwrap();

    /// Total proposal-generator calls that failed after exhausting retries
    pub static ref PROPOSAL_GENERATOR_FAILURES: IntCounter = register_int_counter!(
        "procur_proposal_generator_failures_total",
        "Total proposal generator calls that exhausted retries"
    )
    .unwrap();

    /// Proposal-generator retries by attempt number
    pub static ref PROPOSAL_GENERATOR_RETRIES: IntCounterVec = register_int_counter_vec!(
        "procur_proposal_generator_retries_total",
        "Total proposal generator retry attempts",
        &["attempt"]
    )
    .unwrap();

    // ═══════════════════════════════════════════════════════════════════════════
    // POLICY / GUARDRAIL METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Policy violations by code
    pub static ref POLICY_VIOLATIONS: IntCounterVec = register_int_counter_vec!(
        "procur_policy_violations_total",
        "Total policy violations by code",
        &["code", "blocking"]
    )
    .unwrap();

    /// Guardrail alerts by code
    pub static ref GUARDRAIL_ALERTS: IntCounterVec = register_int_counter_vec!(
        "procur_guardrail_alerts_total",
        "Total guardrail alerts by code",
        &["code", "blocking"]
    )
    .unwrap();

    // ═══════════════════════════════════════════════════════════════════════════
    // PIPELINE METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Pipeline run duration histogram (milliseconds), from intake to bundled result
    pub static ref PIPELINE_DURATION: Histogram = register_histogram!(
        "procur_pipeline_duration_ms",
        "Full pipeline run duration in milliseconds",
        vec![100.0, 500.0, 1000.0, 5000.0, 15000.0, 60000.0, 300000.0]
    )
    .unwrap();

    /// Shortlisted vendor count per run
    pub static ref SHORTLIST_SIZE: HistogramVec = register_histogram_vec!(
        "procur_shortlist_size",
        "Number of vendors shortlisted per pipeline run",
        &["request_type"],
        vec![0.0, 1.0, 2.0, 3.0, 5.0, 8.0, 13.0]
    )
    .unwrap();
}
