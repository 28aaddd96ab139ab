//! Concession engine and negotiation engine (spec components F and G): lever
//! enumeration, strategy selection, bundle generation, exchange enforcement,
//! and the close/acceptance decision procedures the buyer and seller agents
//! drive their round loops with.

pub mod bundle;
pub mod close;
pub mod concession;
pub mod exchange;
pub mod strategy;

pub use bundle::*;
pub use close::*;
pub use concession::*;
pub use exchange::*;
pub use strategy::*;
