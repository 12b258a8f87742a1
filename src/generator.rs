//! Sequence generation for the three allocation policies.
//!
//! All randomness comes from the caller's RNG so that a seeded `StdRng`
//! reproduces a whole session.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::str::FromStr;

use crate::error::{AllocError, Result};
use crate::label::{GroupCounts, Label, Sequence};
use crate::policy::AllocationPolicy;

/// Longest run the manual policy tries to allow.
pub const DEFAULT_MAX_RUN_LENGTH: usize = 3;

/// Target gaps between the favored and the other group, in labels.
pub const IMBALANCE_CHOICES: [usize; 3] = [0, 2, 4];

/// How the manual policy builds its list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManualStrategy {
    /// Near-balanced multiset, shuffled, then run-capped by swaps.
    BalancedShuffle,
    /// Coin flips, forced to switch after `max_run_length` identical labels.
    StreakBreak,
}

impl ManualStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManualStrategy::BalancedShuffle => "balanced_shuffle",
            ManualStrategy::StreakBreak => "streak_break",
        }
    }
}

impl FromStr for ManualStrategy {
    type Err = AllocError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "balanced_shuffle" | "balanced" | "shuffle" => Ok(ManualStrategy::BalancedShuffle),
            "streak_break" | "streak" => Ok(ManualStrategy::StreakBreak),
            other => Err(AllocError::invalid(format!("unknown manual strategy '{}'", other))),
        }
    }
}

/// Pre-selected group sizes for one balanced-shuffle sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualPlan {
    /// Gap between the two groups; one of `IMBALANCE_CHOICES`.
    pub imbalance: usize,
    pub favored: Label,
}

impl ManualPlan {
    pub fn balanced() -> Self {
        Self {
            imbalance: 0,
            favored: Label::A,
        }
    }

    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let imbalance = IMBALANCE_CHOICES[rng.gen_range(0..IMBALANCE_CHOICES.len())];
        Self {
            imbalance,
            favored: coin(rng),
        }
    }

    /// Group sizes for a sequence of length `n`.
    ///
    /// The split is computed on `n` rounded up to even; the favored group is
    /// clamped to `n` and the other group takes the remainder, so the total
    /// is always exactly `n`.
    pub fn target_counts(&self, n: usize) -> GroupCounts {
        let n_even = n + n % 2;
        let favored = (n_even / 2 + self.imbalance / 2).min(n);
        let other = n - favored;
        match self.favored {
            Label::A => GroupCounts::new(favored, other),
            Label::B => GroupCounts::new(other, favored),
        }
    }
}

/// Reject lengths the generator cannot honor.
pub fn check_length(n: usize) -> Result<()> {
    if n == 0 {
        return Err(AllocError::invalid("sequence length must be positive"));
    }
    Ok(())
}

/// Parse a user-supplied sequence length, rejecting non-integers and values <= 0.
pub fn parse_sequence_length(raw: &str) -> Result<usize> {
    let trimmed = raw.trim();
    let value: i64 = trimmed.parse().map_err(|_| {
        AllocError::invalid(format!("sequence length must be an integer, got '{}'", trimmed))
    })?;
    if value <= 0 {
        return Err(AllocError::invalid(format!(
            "sequence length must be positive, got {}",
            value
        )));
    }
    usize::try_from(value)
        .map_err(|_| AllocError::invalid(format!("sequence length {} is too large", value)))
}

#[derive(Debug, Clone)]
pub struct SequenceGenerator {
    max_run_length: usize,
    manual_strategy: ManualStrategy,
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self {
            max_run_length: DEFAULT_MAX_RUN_LENGTH,
            manual_strategy: ManualStrategy::BalancedShuffle,
        }
    }
}

impl SequenceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_run_length(mut self, max_run_length: usize) -> Self {
        self.max_run_length = max_run_length.max(1);
        self
    }

    pub fn with_manual_strategy(mut self, strategy: ManualStrategy) -> Self {
        self.manual_strategy = strategy;
        self
    }

    pub fn max_run_length(&self) -> usize {
        self.max_run_length
    }

    pub fn manual_strategy(&self) -> ManualStrategy {
        self.manual_strategy
    }

    /// Produce a fresh sequence of length `n` under `policy`.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        policy: AllocationPolicy,
        n: usize,
        rng: &mut R,
    ) -> Result<Sequence> {
        check_length(n)?;
        let labels = match policy {
            AllocationPolicy::Systematic => systematic(n),
            AllocationPolicy::Manual => match self.manual_strategy {
                ManualStrategy::BalancedShuffle => {
                    let plan = ManualPlan::draw(rng);
                    self.balanced_shuffle(n, plan, rng)
                }
                ManualStrategy::StreakBreak => streak_break(n, self.max_run_length, rng),
            },
            AllocationPolicy::Random => random(n, rng),
        };
        Ok(Sequence::from(labels))
    }

    /// Balanced-shuffle manual sequence with caller-chosen group sizes.
    pub fn generate_manual_with_plan<R: Rng + ?Sized>(
        &self,
        n: usize,
        plan: ManualPlan,
        rng: &mut R,
    ) -> Result<Sequence> {
        check_length(n)?;
        Ok(Sequence::from(self.balanced_shuffle(n, plan, rng)))
    }

    fn balanced_shuffle<R: Rng + ?Sized>(
        &self,
        n: usize,
        plan: ManualPlan,
        rng: &mut R,
    ) -> Vec<Label> {
        let target = plan.target_counts(n);
        let mut labels = Vec::with_capacity(n);
        labels.extend(std::iter::repeat(Label::A).take(target.a));
        labels.extend(std::iter::repeat(Label::B).take(target.b));
        labels.shuffle(rng);
        cap_runs(&mut labels, self.max_run_length);
        labels
    }
}

fn coin<R: Rng + ?Sized>(rng: &mut R) -> Label {
    if rng.gen_bool(0.5) {
        Label::A
    } else {
        Label::B
    }
}

fn systematic(n: usize) -> Vec<Label> {
    (0..n)
        .map(|i| if i % 2 == 0 { Label::A } else { Label::B })
        .collect()
}

fn random<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<Label> {
    (0..n).map(|_| coin(rng)).collect()
}

fn streak_break<R: Rng + ?Sized>(n: usize, max_run: usize, rng: &mut R) -> Vec<Label> {
    let max_run = max_run.max(1);
    // Seeded with a mixed window so the first draws are free coin flips.
    let mut window: VecDeque<Label> = (0..max_run)
        .map(|i| if i % 2 == 0 { Label::A } else { Label::B })
        .collect();
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        let first = window[0];
        let next = if window.iter().all(|&l| l == first) {
            first.other()
        } else {
            coin(rng)
        };
        out.push(next);
        window.pop_front();
        window.push_back(next);
    }
    out
}

/// Break runs longer than `max_run` by swapping labels; returns the swap count.
///
/// Scans left to right. A run that would exceed the cap takes the nearest
/// differing label ahead of it. On a single-label tail it instead takes the
/// nearest earlier label that can move without creating an over-long run.
/// Swaps keep the multiset intact, so group counts never change. If no
/// candidate exists the run is left alone.
pub fn cap_runs(labels: &mut [Label], max_run: usize) -> usize {
    let max_run = max_run.max(1);
    let mut swaps = 0;
    let mut run = 1;
    for i in 1..labels.len() {
        if labels[i] != labels[i - 1] {
            run = 1;
            continue;
        }
        run += 1;
        if run <= max_run {
            continue;
        }
        let current = labels[i];
        let slot = (i + 1..labels.len())
            .find(|&j| labels[j] != current)
            .or_else(|| backward_slot(labels, i, max_run));
        if let Some(j) = slot {
            labels.swap(i, j);
            swaps += 1;
            run = 1;
        }
    }
    swaps
}

fn backward_slot(labels: &[Label], i: usize, max_run: usize) -> Option<usize> {
    let current = labels[i];
    (0..i).rev().find(|&k| {
        if labels[k] == current {
            return false;
        }
        // `i` turns into the other label after the swap, bounding the right side.
        let left = labels[..k].iter().rev().take_while(|&&l| l == current).count();
        let right = labels[k + 1..i].iter().take_while(|&&l| l == current).count();
        left + right + 1 <= max_run
    })
}
