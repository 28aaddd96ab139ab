//! Pure, deterministic scoring kernel (spec component A). No I/O, no shared state;
//! every function here is a referentially transparent computation over its inputs.

pub mod compliance;
pub mod error;
pub mod feature;
pub mod sla;
pub mod tco;
pub mod utility;
pub mod zopa;

pub use compliance::*;
pub use error::*;
pub use feature::*;
pub use sla::*;
pub use tco::*;
pub use utility::*;
pub use zopa::*;

use rust_decimal::Decimal;

/// Round a `Decimal` to 2 places, half-up, matching every money computation in the
/// kernel (`round2` in the evaluation spec).
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp(2)
}
