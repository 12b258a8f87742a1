//! Synthetic "study outcome" numbers per allocation policy.
//!
//! These are display values for teaching, not inference: each policy draws
//! its effect size and p-value from a fixed range that mimics how studies
//! allocated that way tend to read.
//!
//! | Policy     | effect size            | p-value        |
//! |------------|------------------------|----------------|
//! | systematic | 0.0                    | U(0.80, 0.99)  |
//! | manual     | 0.20 + U(0.10, 0.30)   | U(0.00, 0.08)  |
//! | random     | 0.20 + U(-0.10, 0.10)  | U(0.05, 0.30)  |

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::policy::AllocationPolicy;

/// Effect every simulated study would find with honest allocation.
pub const TRUE_EFFECT: f64 = 0.20;

/// Conventional significance threshold used by the display layer.
pub const DEFAULT_ALPHA: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MockStats {
    pub effect_size: f64,
    pub p_value: f64,
}

impl MockStats {
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Closed-open draw ranges for one policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockRanges {
    pub effect: (f64, f64),
    pub p_value: (f64, f64),
}

impl MockRanges {
    pub fn for_policy(policy: AllocationPolicy) -> Self {
        match policy {
            AllocationPolicy::Systematic => Self {
                effect: (0.0, 0.0),
                p_value: (0.80, 0.99),
            },
            AllocationPolicy::Manual => Self {
                effect: (TRUE_EFFECT + 0.10, TRUE_EFFECT + 0.30),
                p_value: (0.0, 0.08),
            },
            AllocationPolicy::Random => Self {
                effect: (TRUE_EFFECT - 0.10, TRUE_EFFECT + 0.10),
                p_value: (0.05, 0.30),
            },
        }
    }

    pub fn contains(&self, stats: &MockStats) -> bool {
        let (elo, ehi) = self.effect;
        let (plo, phi) = self.p_value;
        let effect_ok = if elo == ehi {
            stats.effect_size == elo
        } else {
            stats.effect_size >= elo && stats.effect_size < ehi
        };
        effect_ok && stats.p_value >= plo && stats.p_value < phi
    }
}

fn draw<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MockStatsEstimator;

impl MockStatsEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Two independent draws: effect size first, then p-value.
    pub fn estimate<R: Rng + ?Sized>(&self, policy: AllocationPolicy, rng: &mut R) -> MockStats {
        let ranges = MockRanges::for_policy(policy);
        let effect_size = draw(rng, ranges.effect);
        let p_value = draw(rng, ranges.p_value);
        MockStats {
            effect_size,
            p_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_draws_stay_in_range() {
        let est = MockStatsEstimator::new();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..500 {
            for policy in AllocationPolicy::ALL {
                let stats = est.estimate(policy, &mut rng);
                assert!(MockRanges::for_policy(policy).contains(&stats), "{policy}: {stats:?}");
                assert!(stats.effect_size >= 0.0);
                assert!((0.0..=1.0).contains(&stats.p_value));
            }
        }
    }

    #[test]
    fn test_systematic_reads_as_null() {
        let est = MockStatsEstimator::new();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let stats = est.estimate(AllocationPolicy::Systematic, &mut rng);
            assert_eq!(stats.effect_size, 0.0);
            assert!(!stats.is_significant(DEFAULT_ALPHA));
        }
    }

    #[test]
    fn test_manual_is_always_significant() {
        let est = MockStatsEstimator::new();
        let mut rng = StdRng::seed_from_u64(12);
        let significant = (0..200)
            .filter(|_| est.estimate(AllocationPolicy::Manual, &mut rng).is_significant(0.08))
            .count();
        assert_eq!(significant, 200);
    }

    #[test]
    fn test_random_centers_on_true_effect() {
        let est = MockStatsEstimator::new();
        let mut rng = StdRng::seed_from_u64(13);
        let n = 2000;
        let mean = (0..n)
            .map(|_| est.estimate(AllocationPolicy::Random, &mut rng).effect_size)
            .sum::<f64>()
            / n as f64;
        assert!((mean - TRUE_EFFECT).abs() < 0.01, "mean effect {mean}");
    }
}
