use std::collections::VecDeque;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::OfferComponents;

const OPPONENT_RING_SIZE: usize = 3;

/// Running estimate of a counterparty's floor/ceiling and responsiveness, updated
/// after every counterparty move (§4.G).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpponentModel {
    pub price_floor_estimate: Decimal,
    pub price_ceiling_estimate: Decimal,
    pub price_elasticity: f64,
    pub term_elasticity: f64,
    pub consecutive_no_price_moves: u32,
    last_offers: VecDeque<OfferComponents>,
}

impl OpponentModel {
    /// Seeds the model from the vendor's price floor and the buyer's opening anchor,
    /// per §4.H step 1 (`price_floor·0.9`, `anchor·1.1`).
    pub fn seed(price_floor: Decimal, anchor_price: Decimal) -> Self {
        Self {
            price_floor_estimate: price_floor * Decimal::new(9, 1),
            price_ceiling_estimate: anchor_price * Decimal::new(11, 10),
            price_elasticity: 0.5,
            term_elasticity: 0.5,
            consecutive_no_price_moves: 0,
            last_offers: VecDeque::with_capacity(OPPONENT_RING_SIZE),
        }
    }

    /// Last ≤3 counterparty offers, most recent last.
    pub fn last_offers(&self) -> &VecDeque<OfferComponents> {
        &self.last_offers
    }

    /// Updates floor/ceiling/elasticity estimates and pushes `new_offer` onto the
    /// bounded ring (§4.G "opponent-model update").
    pub fn record_move(&mut self, new_offer: &OfferComponents) {
        let small_move_threshold = Decimal::from(5);
        if let Some(prev) = self.last_offers.back() {
            let delta = (new_offer.unit_price - prev.unit_price).abs();
            if delta < small_move_threshold {
                self.consecutive_no_price_moves += 1;
                let tightened = new_offer.unit_price - Decimal::from(25);
                if tightened > self.price_floor_estimate {
                    self.price_floor_estimate = tightened;
                }
            } else {
                self.consecutive_no_price_moves = 0;
                if new_offer.unit_price < self.price_ceiling_estimate {
                    self.price_ceiling_estimate = new_offer.unit_price;
                }
            }
        }
        if self.last_offers.len() == OPPONENT_RING_SIZE {
            self.last_offers.pop_front();
        }
        self.last_offers.push_back(new_offer.clone());
    }

    /// Nudges an elasticity value by `delta`, clamped to `[0.1, 0.9]`.
    pub fn adjust_elasticity(value: f64, delta: f64) -> f64 {
        (value + delta).clamp(0.1, 0.9)
    }
}
