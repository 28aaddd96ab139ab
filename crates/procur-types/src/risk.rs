use serde::{Deserialize, Serialize};

/// Status of a single control evaluated for a vendor's risk card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlStatus {
    Met,
    Partial,
    Breached,
}

/// Per-control risk line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlEntry {
    pub control: String,
    pub status: ControlStatus,
}

/// Vendor risk summary produced alongside compliance assessment (§4.D `build_risk_card`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskCard {
    pub vendor_id: String,
    pub controls: Vec<ControlEntry>,
    pub blocking_breach: bool,
}
