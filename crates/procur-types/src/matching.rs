use serde::{Deserialize, Serialize};

use crate::{ComplianceAssessment, OfferScore};

/// Feature-fit slice of a `VendorMatchSummary` (§4.A feature score, §4.E step 3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureMatch {
    pub score: f64,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

/// Output of the vendor matcher (§4.E): the full fit picture used by shortlisting
/// and by the negotiation loop's compliance notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorMatchSummary {
    pub vendor_id: String,
    pub inferred_category: String,
    pub category_match: bool,
    pub feature: FeatureMatch,
    pub compliance: ComplianceAssessment,
    pub sla_score: f64,
    pub price_fit: f64,
    /// `0.45·feature + 0.30·compliance + 0.15·price + 0.10·sla`, zeroed on a hard gate
    /// (category mismatch, blocking compliance, or zero feature score).
    pub composite_score: f64,
}

impl VendorMatchSummary {
    /// §8 Category-Gate: shortlisted vendors must clear category match and a feature
    /// floor of 0.3.
    pub fn passes_shortlist_gate(&self) -> bool {
        self.category_match && self.feature.score >= 0.3 && !self.compliance.blocking
    }

    /// Projects this summary onto the `OfferScore` shape the kernel otherwise
    /// produces from a live offer, for presentation contexts that only have the
    /// match summary on hand.
    pub fn as_offer_score_hint(&self) -> OfferScore {
        OfferScore {
            spec_match: self.feature.score,
            tco_norm: self.price_fit,
            risk: 1.0 - self.compliance.score,
            time: self.sla_score,
            utility: self.composite_score,
            matched_features: self.feature.matched.clone(),
            missing_features: self.feature.missing.clone(),
        }
    }
}
