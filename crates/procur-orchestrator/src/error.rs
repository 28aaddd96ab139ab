use procur_types::{PolicyViolation, RequestError};

/// §7 error taxonomy, surfaced at the pipeline boundary. Per-vendor failures
/// that the spec treats as a terminal `VendorNegotiationState` (NoZOPA,
/// timeout, cancellation) are not errors here — they are folded into the
/// vendor's finalized state and simply excluded from the presentation bundles.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("proposal generator could not parse intake text: {source}")]
    IntakeFailed {
        #[source]
        source: procur_proposal::ProposalError,
    },

    #[error("intake request failed validation: {0}")]
    RequestInvalid(#[from] RequestError),

    #[error("request blocked by policy: {violations:?}")]
    PolicyBlocked { violations: Vec<PolicyViolation> },

    #[error("seed catalog failed to load: {0}")]
    SeedCatalogUnavailable(String),

    #[error("no vendor cleared the shortlist gate (category match, feature score ≥ 0.3, non-blocking compliance)")]
    NoEligibleVendors,

    #[error("vendor {vendor_id} negotiation task panicked")]
    VendorTaskPanicked { vendor_id: String },
}
