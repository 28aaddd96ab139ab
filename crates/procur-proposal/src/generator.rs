use async_trait::async_trait;
use procur_types::{BuyerStrategy, ClarificationQuestion, NegotiationMessage, OfferComponents, Request, VendorNegotiationState};

use crate::error::ProposalError;

/// Result of `ProposalGenerator::intake`: either a structured request, or the
/// clarification questions the pipeline must surface before it can proceed
/// (§4.L step 1).
#[derive(Debug, Clone)]
pub enum IntakeOutcome {
    Ready(Request),
    NeedsClarification(Vec<ClarificationQuestion>),
}

/// The only way the negotiation core talks to natural-language text (§4.M).
/// An LLM-backed implementation and the deterministic fallback in this crate
/// both satisfy this trait identically as far as callers are concerned.
#[async_trait]
pub trait ProposalGenerator: Send + Sync {
    async fn intake(&self, raw_text: &str, policy_summary: &str) -> Result<IntakeOutcome, ProposalError>;

    async fn propose(
        &self,
        request: &Request,
        state: &VendorNegotiationState,
        strategy: BuyerStrategy,
        bundle: &OfferComponents,
        round: u32,
    ) -> Result<NegotiationMessage, ProposalError>;
}
