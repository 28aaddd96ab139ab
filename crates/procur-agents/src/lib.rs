//! Buyer and seller negotiation agents (§4.H, §4.I): the per-vendor round
//! loop that drives a proposal generator, a seller counter, and the close
//! decision to a terminal outcome.

pub mod buyer;
pub mod error;
pub mod seller;

pub use buyer::*;
pub use error::*;
pub use seller::*;
