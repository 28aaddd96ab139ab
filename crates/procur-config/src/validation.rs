//! Cross-field invariants the layered loader can't express through serde
//! defaults alone.

use crate::{ConfigError, EngineConfig, Result};

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &EngineConfig) -> Result<()> {
    let mut errors = Vec::new();

    if !(0.0..=1.0).contains(&config.thresholds.buyer_accept_threshold) {
        errors.push(ValidationError::new(
            "thresholds.buyer_accept_threshold",
            "must be within [0.0, 1.0]",
        ));
    }
    if !(0.0..=1.0).contains(&config.thresholds.seller_accept_threshold) {
        errors.push(ValidationError::new(
            "thresholds.seller_accept_threshold",
            "must be within [0.0, 1.0]",
        ));
    }
    if config.thresholds.max_rounds == 0 {
        errors.push(ValidationError::new("thresholds.max_rounds", "must be at least 1"));
    }
    if config.thresholds.discount_rate < 0.0 {
        errors.push(ValidationError::new("thresholds.discount_rate", "cannot be negative"));
    }
    if !(0.0..=1.0).contains(&config.thresholds.lever_epsilon) {
        errors.push(ValidationError::new(
            "thresholds.lever_epsilon",
            "must be within [0.0, 1.0]",
        ));
    }

    let weight_sum =
        config.scoring.value + config.scoring.cost + config.scoring.risk + config.scoring.time;
    if (weight_sum - 1.0).abs() > 1e-6 {
        errors.push(ValidationError::new(
            "scoring",
            format!("value+cost+risk+time must sum to 1.0, got {weight_sum}"),
        ));
    }

    if config.proposal.proposal_retries == 0 {
        errors.push(ValidationError::new(
            "proposal.proposal_retries",
            "at least one retry is required before the deterministic fallback applies",
        ));
    }

    if config.rate_limit.rate_limit_capacity == 0 {
        errors.push(ValidationError::new(
            "rate_limit.rate_limit_capacity",
            "must be greater than 0",
        ));
    }

    if let Some(workers) = config.negotiation.max_concurrent_workers {
        if workers == 0 {
            errors.push(ValidationError::new(
                "negotiation.max_concurrent_workers",
                "must be greater than 0 when set",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        let joined = errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; ");
        Err(ConfigError::ValidationError(joined))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn mismatched_scoring_weights_rejected() {
        let mut config = EngineConfig::default();
        config.scoring.value = 0.9;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn zero_max_rounds_rejected() {
        let mut config = EngineConfig::default();
        config.thresholds.max_rounds = 0;
        assert!(validate_config(&config).is_err());
    }
}
