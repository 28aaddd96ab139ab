#[derive(Debug, thiserror::Error)]
pub enum ProposalError {
    #[error("intake text did not match any known request pattern: {reason}")]
    UnparseableIntake { reason: String },
    #[error("proposal generator returned malformed output: {reason}")]
    SchemaValidation { reason: String },
    #[error("proposal generator call timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },
}
