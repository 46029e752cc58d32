//! Runtime option surface: one schema serving both `serde` round-tripping
//! and the console binary's `clap` derive — two views over one struct,
//! keeping option parsing decoupled from the logic that consumes it.
//!
//! Enum-valued options (move sort/record type, stopping condition) are kept
//! as plain strings here rather than `clap::ValueEnum` derives, resolved to
//! their domain type by the accessor methods below; this keeps `clap` as an
//! optional, feature-gated dependency without needing `Display`/`FromStr`
//! impls on every domain enum just to satisfy the derive.

use crate::game::{MoveRecordType, MoveSortType};
use crate::simulate::StoppingCondition;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Parser))]
#[cfg_attr(
    feature = "cli",
    command(name = "console", about = "Move generation, simulation, and inference over a crossword-board position")
)]
pub struct Config {
    /// Which operation the console binary runs: `genmoves`, `sim`, or `infer`.
    #[cfg_attr(feature = "cli", arg(long, default_value = "genmoves"))]
    pub mode: String,

    /// Lexicon name shared by both players unless `l1`/`l2` override it.
    /// Loading a named lexicon's KWG/KLV from disk is outside this crate's
    /// scope; the console binary falls back to a synthetic KWG/KLV.
    #[cfg_attr(feature = "cli", arg(long))]
    pub lex: Option<String>,
    #[cfg_attr(feature = "cli", arg(long))]
    pub l1: Option<String>,
    #[cfg_attr(feature = "cli", arg(long))]
    pub l2: Option<String>,
    #[cfg_attr(feature = "cli", arg(long, default_value = "english"))]
    pub ld: String,

    /// Starting position, in CGP form. Defaults to an empty board.
    #[cfg_attr(feature = "cli", arg(long))]
    pub cgp: Option<String>,

    #[cfg_attr(feature = "cli", arg(long, default_value = "equity"))]
    pub s1: String,
    #[cfg_attr(feature = "cli", arg(long, default_value = "equity"))]
    pub s2: String,
    #[cfg_attr(feature = "cli", arg(long, default_value = "best"))]
    pub r1: String,
    #[cfg_attr(feature = "cli", arg(long, default_value = "best"))]
    pub r2: String,

    /// Number of candidate plays `genmoves` returns.
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 15))]
    pub numplays: usize,

    /// Plies rolled out per simulator iteration.
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 2))]
    pub plies: usize,
    /// Max simulator/inference iterations.
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 100_000))]
    pub iterations: usize,
    /// `none`, `95`, `98`, or `99` — simulator probabilistic stopping condition.
    #[cfg_attr(feature = "cli", arg(long, default_value = "none"))]
    pub cond: String,
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 1))]
    pub threads: usize,
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 0))]
    pub seed: u64,

    /// Equity margin for inference consistency checks.
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 5.0))]
    pub infer_equity_margin: f32,
    /// Bound on how many candidate leaves inference keeps.
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 10_000))]
    pub infer_max_candidates: usize,
    /// The move to infer a rack for, in UCGI move-string form. Required by `infer` mode.
    #[cfg_attr(feature = "cli", arg(long))]
    pub observed: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: "genmoves".to_string(),
            lex: None,
            l1: None,
            l2: None,
            ld: "english".to_string(),
            cgp: None,
            s1: "equity".to_string(),
            s2: "equity".to_string(),
            r1: "best".to_string(),
            r2: "best".to_string(),
            numplays: 15,
            plies: 2,
            iterations: 100_000,
            cond: "none".to_string(),
            threads: 1,
            seed: 0,
            infer_equity_margin: 5.0,
            infer_max_candidates: 10_000,
            observed: None,
        }
    }
}

impl Config {
    pub fn move_sort_type(sort: &str) -> MoveSortType {
        match sort.to_lowercase().as_str() {
            "score" => MoveSortType::Score,
            _ => MoveSortType::Equity,
        }
    }

    pub fn move_record_type(record: &str) -> MoveRecordType {
        match record.to_lowercase().as_str() {
            "all" => MoveRecordType::RecordAll,
            _ => MoveRecordType::RecordBest,
        }
    }

    pub fn stopping_condition(&self) -> StoppingCondition {
        match self.cond.to_lowercase().as_str() {
            "95" => StoppingCondition::P95,
            "98" => StoppingCondition::P98,
            "99" => StoppingCondition::P99,
            _ => StoppingCondition::None,
        }
    }

    pub fn thread_count(&self) -> usize {
        self.threads.clamp(1, crate::MAX_THREADS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.numplays, config.numplays);
        assert_eq!(back.plies, config.plies);
    }

    #[test]
    fn move_sort_type_defaults_to_equity_for_unknown_strings() {
        assert_eq!(Config::move_sort_type("bogus"), MoveSortType::Equity);
        assert_eq!(Config::move_sort_type("score"), MoveSortType::Score);
    }

    #[test]
    fn stopping_condition_parses_percentile_strings() {
        let mut config = Config::default();
        config.cond = "98".to_string();
        assert_eq!(config.stopping_condition(), StoppingCondition::P98);
    }
}
