use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::RequestType;

/// Policy envelope a requester operates under; mutable during a run (unlike the rest of `Request`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestPolicyContext {
    pub budget_cap: Option<Decimal>,
    pub risk_threshold: Option<f64>,
    #[serde(default)]
    pub approval_chain: Vec<String>,
}

impl Default for RequestPolicyContext {
    fn default() -> Self {
        Self {
            budget_cap: None,
            risk_threshold: None,
            approval_chain: Vec::new(),
        }
    }
}

/// Lifecycle status of a `Request`, distinct from a vendor's `FsmState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestLifecycleState {
    Draft,
    NeedsClarification,
    Active,
    Closed,
}

/// A buyer's intake of what they want to procure.
///
/// Immutable once created except `status` and `policy_context`, which the run may
/// update as approvals are gathered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub request_id: String,
    pub requester_id: String,
    pub request_type: RequestType,
    pub description: String,
    /// Free-form structured facts extracted from intake (e.g. `risk_score`, `max_term_months`,
    /// `minimum_acceptance_price`, `category`, `_category_inference`).
    #[serde(default)]
    pub specs: BTreeMap<String, serde_json::Value>,
    pub quantity: u32,
    pub budget_min: Option<Decimal>,
    pub budget_max: Option<Decimal>,
    pub currency: String,
    #[serde(default)]
    pub must_haves: BTreeSet<String>,
    #[serde(default)]
    pub nice_to_haves: BTreeSet<String>,
    #[serde(default)]
    pub compliance_requirements: BTreeSet<String>,
    pub billing_cadence: Option<String>,
    #[serde(default)]
    pub policy_context: RequestPolicyContext,
    #[serde(default = "default_status")]
    pub status: RequestLifecycleState,
}

fn default_status() -> RequestLifecycleState {
    RequestLifecycleState::Draft
}

/// A question the intake step needs answered before a `Request` can be finalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClarificationQuestion {
    pub field: String,
    pub question: String,
    pub required: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("quantity must be positive, got {quantity}")]
    NonPositiveQuantity { quantity: u32 },
    #[error("budget_min ({budget_min}) exceeds budget_max ({budget_max})")]
    BudgetRangeInverted {
        budget_min: Decimal,
        budget_max: Decimal,
    },
}

impl Request {
    /// Enforces the two invariants spelled out in §3: positive quantity, and
    /// `budget_min ≤ budget_max` when both are present.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.quantity == 0 {
            return Err(RequestError::NonPositiveQuantity {
                quantity: self.quantity,
            });
        }
        if let (Some(min), Some(max)) = (self.budget_min, self.budget_max) {
            if min > max {
                return Err(RequestError::BudgetRangeInverted {
                    budget_min: min,
                    budget_max: max,
                });
            }
        }
        Ok(())
    }

    /// Budget per unit for scoring/anchor math, falling back to a generous default
    /// (matching the orchestration layer's intake fallback of qty × $1200) when
    /// neither budget bound is present.
    pub fn budget_per_unit(&self) -> Decimal {
        let total = self
            .budget_max
            .or(self.budget_min)
            .unwrap_or_else(|| Decimal::from(self.quantity) * Decimal::from(1200));
        if self.quantity == 0 {
            total
        } else {
            total / Decimal::from(self.quantity)
        }
    }
}
