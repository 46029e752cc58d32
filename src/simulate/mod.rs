//! Monte-Carlo rollout simulator for ranking a handful of candidate plays by
//! win percentage rather than static equity alone.

pub mod simmer;
pub mod stats;

pub use simmer::{simulate, SimConfig, SimResults, StoppingCondition};
pub use stats::{SimmedPlay, WinPctTable};
