//! Session-scoped context: RNG, current generation and history ledger.
//!
//! `regenerate` is the only mutating entry point. It builds every sequence
//! and statistic first and commits them together, so readers never see a
//! sequence paired with stats from another generation.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::json;

use crate::config::Config;
use crate::error::Result;
use crate::generator::SequenceGenerator;
use crate::history::{GenerationHistory, GenerationRecord};
use crate::label::Sequence;
use crate::logging::{self, Domain, Level, ProfileScope};
use crate::mock_stats::MockStatsEstimator;
use crate::policy::AllocationPolicy;
use crate::runs;

/// One sequence per policy, all of the same length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceSet {
    pub systematic: Sequence,
    pub manual: Sequence,
    pub random: Sequence,
}

impl SequenceSet {
    pub fn get(&self, policy: AllocationPolicy) -> &Sequence {
        match policy {
            AllocationPolicy::Systematic => &self.systematic,
            AllocationPolicy::Manual => &self.manual,
            AllocationPolicy::Random => &self.random,
        }
    }

    /// Sequences in display order.
    pub fn iter(&self) -> impl Iterator<Item = (AllocationPolicy, &Sequence)> {
        AllocationPolicy::ALL.into_iter().map(move |p| (p, self.get(p)))
    }
}

/// The committed result of one regenerate step.
#[derive(Debug, Clone, Serialize)]
pub struct Generation {
    pub id: u64,
    pub sequences: SequenceSet,
    pub records: Vec<GenerationRecord>,
}

impl Generation {
    pub fn record(&self, policy: AllocationPolicy) -> Option<&GenerationRecord> {
        self.records.iter().find(|r| r.policy == policy)
    }
}

pub struct AllocationSession {
    sequence_length: usize,
    seed: Option<u64>,
    generator: SequenceGenerator,
    estimator: MockStatsEstimator,
    history: GenerationHistory,
    rng: StdRng,
    current: Option<Generation>,
}

impl AllocationSession {
    pub fn new(cfg: &Config) -> Self {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(cfg, rng)
    }

    /// Session with an explicit RNG, for reproducible runs.
    pub fn with_rng(cfg: &Config, rng: StdRng) -> Self {
        Self {
            sequence_length: cfg.sequence_length,
            seed: cfg.seed,
            generator: SequenceGenerator::new().with_manual_strategy(cfg.manual_strategy),
            estimator: MockStatsEstimator::new(),
            history: GenerationHistory::new(cfg.history_capacity),
            rng,
            current: None,
        }
    }

    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn history(&self) -> &GenerationHistory {
        &self.history
    }

    /// Latest committed generation; `None` until the first regenerate.
    pub fn current(&self) -> Option<&Generation> {
        self.current.as_ref()
    }

    /// Draw one fresh sequence per policy.
    pub fn generate_all(&mut self, n: usize) -> Result<SequenceSet> {
        Ok(SequenceSet {
            systematic: self.generator.generate(AllocationPolicy::Systematic, n, &mut self.rng)?,
            manual: self.generator.generate(AllocationPolicy::Manual, n, &mut self.rng)?,
            random: self.generator.generate(AllocationPolicy::Random, n, &mut self.rng)?,
        })
    }

    /// Derive run statistics and mock outcomes for each sequence.
    pub fn compute_stats(
        &mut self,
        sequences: &SequenceSet,
        generation_id: u64,
    ) -> Vec<GenerationRecord> {
        sequences
            .iter()
            .map(|(policy, seq)| {
                let counts = seq.counts();
                let run_stats = runs::analyze(seq.labels());
                let mock_stats = self.estimator.estimate(policy, &mut self.rng);
                logging::log_generation(
                    generation_id,
                    policy.as_str(),
                    counts.a,
                    counts.b,
                    run_stats.longest_run,
                    mock_stats.effect_size,
                    mock_stats.p_value,
                );
                logging::log_audit(generation_id, policy.as_str(), &seq.fingerprint());
                GenerationRecord {
                    generation_id,
                    policy,
                    count_a: counts.a,
                    count_b: counts.b,
                    run_stats,
                    mock_stats,
                }
            })
            .collect()
    }

    /// Generate, analyze and record one generation as a single step.
    pub fn regenerate(&mut self) -> Result<&Generation> {
        let generation_id = self.history.next_generation_id();
        let _scope = ProfileScope::with_context(
            "regenerate",
            &[("generation_id", json!(generation_id))],
        );

        let sequences = self.generate_all(self.sequence_length)?;
        let records = self.compute_stats(&sequences, generation_id);

        let evicted = self.history.append(generation_id, records.clone())?;
        logging::log_history_trim(
            generation_id,
            self.history.len(),
            evicted,
            self.history.capacity(),
        );
        logging::log(
            Level::Info,
            Domain::Session,
            "regenerated",
            logging::obj(&[
                ("generation_id", json!(generation_id)),
                ("sequence_length", json!(self.sequence_length)),
            ]),
        );

        Ok(&*self.current.insert(Generation {
            id: generation_id,
            sequences,
            records,
        }))
    }
}
