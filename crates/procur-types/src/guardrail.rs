use serde::{Deserialize, Serialize};

/// A stateless finding from the guardrail service (§4.C): counterparty verification,
/// price outliers, or deposit-policy gaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailAlert {
    pub code: String,
    pub message: String,
    pub blocking: bool,
}

impl GuardrailAlert {
    pub fn non_blocking(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            blocking: false,
        }
    }

    pub fn blocking(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            blocking: true,
        }
    }
}
