//! Procurement negotiation automation, assembled from the `procur-*` crates.
//!
//! This crate has no CLI surface; hosts embed [`procur_orchestrator::Pipeline`]
//! (built via [`procur_orchestrator::PipelineBuilder`]) and drive it with their
//! own `ProposalGenerator` and `SeedCatalog` implementations (§6).

pub use procur_config::EngineConfig;
pub use procur_orchestrator::{
    BuilderError, Clock, OrchestratorError, Pipeline, PipelineBuilder, PipelineResult, SeedCatalog, StaticSeedCatalog,
    SystemClock,
};
pub use procur_types::*;
