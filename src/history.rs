//! Rolling ledger of per-policy statistics, one record set per generation.
//!
//! Records are kept newest first: `(generation_id desc, policy asc)`.
//! Every append is followed by a trim to the configured capacity, so a
//! generation's records always land together before anything is evicted.

use serde::{Deserialize, Serialize};

use crate::error::{AllocError, Result};
use crate::label::GroupCounts;
use crate::mock_stats::MockStats;
use crate::policy::AllocationPolicy;
use crate::runs::RunStats;

pub const DEFAULT_HISTORY_CAPACITY: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation_id: u64,
    pub policy: AllocationPolicy,
    pub count_a: usize,
    pub count_b: usize,
    pub run_stats: RunStats,
    pub mock_stats: MockStats,
}

impl GenerationRecord {
    pub fn counts(&self) -> GroupCounts {
        GroupCounts::new(self.count_a, self.count_b)
    }

    pub fn len(&self) -> usize {
        self.count_a + self.count_b
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationHistory {
    capacity: usize,
    records: Vec<GenerationRecord>,
}

impl Default for GenerationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl GenerationHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: Vec::with_capacity(capacity + AllocationPolicy::ALL.len()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Highest stored generation id, or 0 when empty.
    pub fn current_generation_id(&self) -> u64 {
        self.records
            .iter()
            .map(|r| r.generation_id)
            .max()
            .unwrap_or(0)
    }

    pub fn next_generation_id(&self) -> u64 {
        self.current_generation_id() + 1
    }

    /// Add every record of a new generation, then trim.
    ///
    /// Returns the number of records evicted by the trim.
    pub fn append(&mut self, generation_id: u64, records: Vec<GenerationRecord>) -> Result<usize> {
        if records.is_empty() {
            return Err(AllocError::invalid("generation has no records"));
        }
        if generation_id <= self.current_generation_id() {
            return Err(AllocError::invalid(format!(
                "generation {} is not newer than {}",
                generation_id,
                self.current_generation_id()
            )));
        }
        if let Some(stray) = records.iter().find(|r| r.generation_id != generation_id) {
            return Err(AllocError::invalid(format!(
                "record for {} carries generation {} instead of {}",
                stray.policy, stray.generation_id, generation_id
            )));
        }
        self.records.extend(records);
        Ok(self.trim())
    }

    /// Sort newest first and drop everything beyond capacity.
    pub fn trim(&mut self) -> usize {
        self.records.sort_by(|x, y| {
            y.generation_id
                .cmp(&x.generation_id)
                .then_with(|| x.policy.cmp(&y.policy))
        });
        let evicted = self.records.len().saturating_sub(self.capacity);
        self.records.truncate(self.capacity);
        evicted
    }

    pub fn all(&self) -> &[GenerationRecord] {
        &self.records
    }

    /// Records of the newest generation.
    pub fn current_records(&self) -> Vec<&GenerationRecord> {
        let current = self.current_generation_id();
        self.records
            .iter()
            .filter(|r| r.generation_id == current)
            .collect()
    }

    /// Distinct stored generation ids, newest first.
    pub fn generation_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.records.iter().map(|r| r.generation_id).collect();
        ids.dedup();
        ids
    }

    /// Pretty JSON snapshot of the ledger.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
