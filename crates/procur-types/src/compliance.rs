use serde::{Deserialize, Serialize};

/// Per-framework disposition produced by `assess_vendor` (§4.D).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    Missing,
}

/// One requirement's finding against a specific vendor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceFinding {
    pub framework: String,
    pub status: ComplianceStatus,
    pub blocking: bool,
    pub evidence: Option<String>,
}

/// Aggregate compliance result for a (request, vendor) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceAssessment {
    pub score: f64,
    pub findings: Vec<ComplianceFinding>,
    pub blocking: bool,
}

impl ComplianceAssessment {
    /// No requirements ⇒ perfect, non-blocking score (§4.D / §4.A feature-score parity).
    pub fn vacuous() -> Self {
        Self {
            score: 1.0,
            findings: Vec::new(),
            blocking: false,
        }
    }
}
