//! Token-bucket rate limiting for proposal-generator calls (§4.Q).

pub mod limiter;

pub use limiter::*;
