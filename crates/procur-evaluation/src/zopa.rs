use rust_decimal::Decimal;

/// §4.A: a deal is feasible only if the buyer's per-unit budget reaches at least
/// as low as the tighter of the seller's stated floor and whatever the concession
/// engine can still produce.
pub fn detect_zopa(
    buyer_budget_per_unit: Decimal,
    seller_floor: Decimal,
    concessions_min_price: Decimal,
) -> bool {
    buyer_budget_per_unit >= seller_floor.min(concessions_min_price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zopa_exists_when_budget_covers_floor() {
        assert!(detect_zopa(Decimal::new(900, 0), Decimal::new(800, 0), Decimal::new(780, 0)));
    }

    #[test]
    fn no_zopa_when_budget_under_best_possible_price() {
        assert!(!detect_zopa(Decimal::new(500, 0), Decimal::new(900, 0), Decimal::new(880, 0)));
    }
}
