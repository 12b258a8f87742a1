use serde::Serialize;

use crate::error::{AllocError, Result};
use crate::generator::{parse_sequence_length, ManualStrategy};
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::policy::AllocationPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Labels per generated sequence
    pub sequence_length: usize,
    /// Records kept by the generation history
    pub history_capacity: usize,
    /// How the manual policy builds its sequences
    pub manual_strategy: ManualStrategy,
    /// Show only this policy's panel; `None` shows all three
    pub policy: Option<AllocationPolicy>,
    /// Fixed RNG seed; `None` draws from OS entropy
    pub seed: Option<u64>,
    /// Regenerations performed by the CLI
    pub generations: u32,
    /// Cells per row in the rendered block grid
    pub grid_columns: usize,
    /// Print the history ledger as JSON instead of a table
    pub history_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sequence_length: 300,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            manual_strategy: ManualStrategy::BalancedShuffle,
            policy: None,
            seed: None,
            generations: 1,
            grid_columns: 50,
            history_json: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup (env vars in production, maps in tests).
    ///
    /// The sequence length, history capacity, manual strategy and policy are
    /// validated; the other knobs fall back to their defaults when
    /// unparseable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let sequence_length = match lookup("SEQ_LEN") {
            Some(raw) => parse_sequence_length(&raw)?,
            None => defaults.sequence_length,
        };
        let history_capacity = match lookup("HISTORY_CAPACITY") {
            Some(raw) => parse_capacity(&raw)?,
            None => defaults.history_capacity,
        };
        let manual_strategy = match lookup("MANUAL_STRATEGY") {
            Some(raw) => raw.parse()?,
            None => defaults.manual_strategy,
        };
        let policy = match lookup("POLICY") {
            Some(raw) if raw.trim() == "all" => None,
            Some(raw) => Some(raw.parse()?),
            None => defaults.policy,
        };
        Ok(Self {
            sequence_length,
            history_capacity,
            manual_strategy,
            policy,
            seed: lookup("SEED").and_then(|v| v.trim().parse().ok()),
            generations: lookup("GENERATIONS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.generations),
            grid_columns: lookup("GRID_COLUMNS")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|&c| c > 0)
                .unwrap_or(defaults.grid_columns),
            history_json: lookup("HISTORY_JSON")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(defaults.history_json),
        })
    }
}

fn parse_capacity(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(c) if c >= 1 => Ok(c),
        _ => Err(AllocError::invalid(format!(
            "history capacity must be a positive integer, got '{}'",
            raw.trim()
        ))),
    }
}
