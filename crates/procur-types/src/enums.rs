use serde::{Deserialize, Serialize};

/// Broad shape of what's being procured; drives category inference defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    Saas,
    Goods,
}

/// Which side of the negotiation emitted a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Buyer,
    Seller,
}

/// Allowed settlement terms; vendors opt in to a subset via `guardrails.payment_terms_allowed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PaymentTerms {
    Net15,
    Net30,
    Net45,
    Milestones,
    Deposit,
}

/// Hint carried on a `NegotiationMessage` telling the loop what the proposer expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStepHint {
    Accept,
    Counter,
    RequestInfo,
    Escalate,
}

/// Per-round disposition recorded in `RoundMemory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationDecision {
    Accept,
    Counter,
    RequestInfo,
    Drop,
}

/// Risk tier attached to a vendor; informs `determine_approvals`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Med,
    High,
}

/// Where a negotiation ultimately lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationOutcome {
    Accepted,
    Dropped,
    Stalemate,
}

/// The finite states a `VendorNegotiationState` walks through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FsmState {
    Init,
    Negotiating,
    ReplanRequired,
    NoZopa,
    Accepted,
    Dropped,
}

/// Which non-price dimension a candidate evaluation primarily traded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lever {
    Price,
    Term,
    Payment,
    Value,
}

/// Buyer-side negotiation strategies (§4.G).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuyerStrategy {
    PriceAnchor,
    TermTrade,
    PaymentTrade,
    ValueAdd,
    Ultimatum,
    PricePressure,
}

/// Seller-side negotiation strategies (§4.G).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SellerStrategy {
    AnchorHigh,
    RejectBelowFloor,
    MinimalConcession,
    TermValue,
    PaymentPremium,
    CloseDeal,
    GradualConcession,
}

/// Toggles counterparty-verification guardrails (§4.C).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Simulation,
    Production,
}

impl PaymentTerms {
    /// Net terms in calendar days used by PV discounting (§4.G exchange enforcement);
    /// `Milestones`/`Deposit` have no fixed day count and are excluded from PV logic.
    pub fn net_days(self) -> Option<i64> {
        match self {
            PaymentTerms::Net15 => Some(15),
            PaymentTerms::Net30 => Some(30),
            PaymentTerms::Net45 => Some(45),
            PaymentTerms::Milestones | PaymentTerms::Deposit => None,
        }
    }
}
