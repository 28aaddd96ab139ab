//! Proposal generator trait and deterministic fallback implementation (§4.M).
//!
//! Every text-facing boundary of the negotiation core goes through the
//! `ProposalGenerator` trait in this crate. An LLM-backed implementation lives
//! outside this workspace; `DeterministicProposalGenerator` is the one the core
//! ships with, and the one every other generator falls back to after exhausting
//! its retries.

pub mod deterministic;
pub mod error;
pub mod generator;

pub use deterministic::*;
pub use error::*;
pub use generator::*;
