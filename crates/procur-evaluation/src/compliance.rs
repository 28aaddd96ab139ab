/// Evidence a vendor can offer against a single compliance framework (§4.A).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplianceEvidence {
    Certified,
    AttestedWithReport,
    InProgress,
    Roadmap,
    None,
}

impl ComplianceEvidence {
    fn weight(self) -> f64 {
        match self {
            ComplianceEvidence::Certified => 1.0,
            ComplianceEvidence::AttestedWithReport => 0.85,
            ComplianceEvidence::InProgress => 0.4,
            ComplianceEvidence::Roadmap => 0.4,
            ComplianceEvidence::None => 0.0,
        }
    }
}

/// Mean evidence weight across every required framework (1.0 if none required);
/// `blocking` is true if any framework's weight falls below 0.8 (§4.A).
pub fn compute_compliance_score(evidence: &[ComplianceEvidence]) -> (f64, bool) {
    if evidence.is_empty() {
        return (1.0, false);
    }
    let weights: Vec<f64> = evidence.iter().map(|e| e.weight()).collect();
    let score = weights.iter().sum::<f64>() / weights.len() as f64;
    let blocking = weights.iter().any(|w| *w < 0.8);
    (score, blocking)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_requirements_is_perfect_and_nonblocking() {
        let (score, blocking) = compute_compliance_score(&[]);
        assert_eq!(score, 1.0);
        assert!(!blocking);
    }

    #[test]
    fn in_progress_evidence_blocks() {
        let (_, blocking) = compute_compliance_score(&[ComplianceEvidence::InProgress]);
        assert!(blocking);
    }

    #[test]
    fn mixed_evidence_averages() {
        let (score, blocking) = compute_compliance_score(&[
            ComplianceEvidence::Certified,
            ComplianceEvidence::AttestedWithReport,
        ]);
        assert!((score - 0.925).abs() < 1e-9);
        assert!(!blocking);
    }
}
