use rust_decimal::Decimal;

/// Errors the evaluation kernel can raise. All but `RoundingDrift` are unreachable
/// in well-formed inputs; they exist so callers get a typed failure instead of a
/// silently wrong number.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("TCO recomputation drifted by {drift} (limit 0.01): base={base}, total={total}")]
    RoundingDrift {
        base: Decimal,
        total: Decimal,
        drift: Decimal,
    },
}
