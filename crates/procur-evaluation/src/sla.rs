/// Vendor support tier, scored per the §4.A table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportTier {
    ExtendedOrTwentyFourSeven,
    Premium,
    BusinessHours,
    EmailOnly,
    Unknown,
}

impl SupportTier {
    fn score(self) -> f64 {
        match self {
            SupportTier::ExtendedOrTwentyFourSeven => 1.0,
            SupportTier::Premium => 0.9,
            SupportTier::BusinessHours => 0.7,
            SupportTier::EmailOnly => 0.4,
            SupportTier::Unknown => 0.5,
        }
    }

    /// Parses the free-form support-tier string a `VendorProfile` carries.
    pub fn parse(raw: &str) -> SupportTier {
        match raw.to_ascii_lowercase().as_str() {
            "extended" | "24-7" | "24/7" => SupportTier::ExtendedOrTwentyFourSeven,
            "premium" => SupportTier::Premium,
            "business_hours" | "business-hours" => SupportTier::BusinessHours,
            "email_only" | "email-only" => SupportTier::EmailOnly,
            _ => SupportTier::Unknown,
        }
    }
}

/// `0.7·sla_pct_normalized + 0.3·support_tier_score` (§4.A). `sla_pct` is a
/// percentage (e.g. `99.9`); values above 100 clamp to a perfect score.
pub fn compute_sla_score(sla_pct: Option<f64>, support_tier: SupportTier) -> f64 {
    let sla_normalized = (sla_pct.unwrap_or(0.0) / 100.0).min(1.0).max(0.0);
    0.7 * sla_normalized + 0.3 * support_tier.score()
}
