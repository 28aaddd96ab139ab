#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("no feasible combination clears vendor {vendor_id}'s floor of {floor}")]
    NoZopa { vendor_id: String, floor: rust_decimal::Decimal },
    #[error("proposal generator failed for vendor {vendor_id} round {round} after {attempts} attempts: {source}")]
    ProposalGeneratorExhausted {
        vendor_id: String,
        round: u32,
        attempts: u32,
        #[source]
        source: procur_proposal::ProposalError,
    },
    #[error("negotiation for vendor {vendor_id} exceeded its round bound of {round_bound}")]
    RoundBoundExceeded { vendor_id: String, round_bound: usize },
}
