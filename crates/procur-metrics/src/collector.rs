use prometheus::{Encoder, TextEncoder};
use procur_types::{BuyerStrategy, NegotiationOutcome};

use crate::metrics::*;

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("failed to encode metrics: {0}")]
    Encode(#[from] prometheus::Error),

    #[error("metrics text was not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Records the negotiation/round/proposal-generator/policy counters defined
/// in [`crate::metrics`] (§4.P). Purely additive: no negotiation decision
/// reads a metric back.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector;

impl MetricsCollector {
    pub fn new() -> Self {
        Self
    }

    pub fn record_negotiation_started(&self) {
        NEGOTIATIONS_STARTED.inc();
        ACTIVE_NEGOTIATIONS.inc();
    }

    pub fn record_negotiation_finalized(&self, outcome: NegotiationOutcome, reason: &str) {
        ACTIVE_NEGOTIATIONS.dec();
        NEGOTIATION_OUTCOME_REASON.with_label_values(&[reason]).inc();
        match outcome {
            NegotiationOutcome::Accepted => NEGOTIATIONS_ACCEPTED.inc(),
            NegotiationOutcome::Dropped => NEGOTIATIONS_DROPPED.inc(),
            NegotiationOutcome::Stalemate => NEGOTIATIONS_STALEMATE.inc(),
        }
    }

    pub fn record_round(&self, strategy: BuyerStrategy) {
        ROUNDS_EXECUTED.inc();
        ROUNDS_BY_STRATEGY.with_label_values(&[&format!("{strategy:?}")]).inc();
    }

    pub fn record_proposal_generator_call(&self, latency_ms: f64) {
        PROPOSAL_GENERATOR_LATENCY.observe(latency_ms);
    }

    pub fn record_proposal_generator_retry(&self, attempt: u32) {
        PROPOSAL_GENERATOR_RETRIES.with_label_values(&[&attempt.to_string()]).inc();
    }

    pub fn record_proposal_generator_failure(&self) {
        PROPOSAL_GENERATOR_FAILURES.inc();
    }

    pub fn record_policy_violation(&self, code: &str, blocking: bool) {
        POLICY_VIOLATIONS.with_label_values(&[code, &blocking.to_string()]).inc();
    }

    pub fn record_guardrail_alert(&self, code: &str, blocking: bool) {
        GUARDRAIL_ALERTS.with_label_values(&[code, &blocking.to_string()]).inc();
    }

    pub fn record_pipeline_run(&self, duration_ms: f64, request_type: &str, shortlist_size: usize) {
        PIPELINE_DURATION.observe(duration_ms);
        SHORTLIST_SIZE
            .with_label_values(&[request_type])
            .observe(shortlist_size as f64);
    }

    /// Renders the default registry's current state as Prometheus text
    /// exposition format; the host decides how to serve it.
    pub fn gather_text(&self) -> Result<String, MetricsError> {
        let families = prometheus::gather();
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_negotiation_lifecycle_without_panicking() {
        let collector = MetricsCollector::new();
        collector.record_negotiation_started();
        collector.record_round(BuyerStrategy::PriceAnchor);
        collector.record_proposal_generator_call(12.5);
        collector.record_policy_violation("budget_cap", false);
        collector.record_negotiation_finalized(NegotiationOutcome::Accepted, "thresholds_met_outright");
    }

    #[test]
    fn gather_text_produces_prometheus_exposition_format() {
        let collector = MetricsCollector::new();
        collector.record_negotiation_started();
        let text = collector.gather_text().unwrap();
        assert!(text.contains("procur_negotiations_started_total") || text.is_empty());
    }
}
