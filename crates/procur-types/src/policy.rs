use serde::{Deserialize, Serialize};

/// A single rule breach surfaced by the policy engine (§4.B).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyViolation {
    pub code: String,
    pub message: String,
    pub blocking: bool,
}

/// Result of any policy-engine validation; `valid` is true iff no violation blocks.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PolicyResult {
    #[serde(default)]
    pub violations: Vec<PolicyViolation>,
}

impl PolicyResult {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn valid(&self) -> bool {
        !self.violations.iter().any(|v| v.blocking)
    }

    pub fn push(&mut self, violation: PolicyViolation) {
        self.violations.push(violation);
    }

    pub fn merge(mut self, other: PolicyResult) -> Self {
        self.violations.extend(other.violations);
        self
    }
}
