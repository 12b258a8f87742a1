use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::AllocError;

/// Algorithm used to produce an allocation sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationPolicy {
    /// Strict A/B alternation.
    Systematic,
    /// Balanced shuffle with a run-length cap, imitating a hand-made list.
    Manual,
    /// Independent fair coin per position.
    Random,
}

impl AllocationPolicy {
    /// Display order used when generating and rendering a generation.
    pub const ALL: [AllocationPolicy; 3] = [
        AllocationPolicy::Systematic,
        AllocationPolicy::Manual,
        AllocationPolicy::Random,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationPolicy::Systematic => "systematic",
            AllocationPolicy::Manual => "manual",
            AllocationPolicy::Random => "random",
        }
    }
}

// History rows tie-break on policy name, so ordering is lexicographic
// rather than declaration order.
impl Ord for AllocationPolicy {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for AllocationPolicy {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for AllocationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AllocationPolicy {
    type Err = AllocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "systematic" | "alternating" => Ok(AllocationPolicy::Systematic),
            "manual" => Ok(AllocationPolicy::Manual),
            "random" | "randomized" => Ok(AllocationPolicy::Random),
            other => Err(AllocError::invalid(format!("unknown policy '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexicographic_order() {
        let mut policies = AllocationPolicy::ALL.to_vec();
        policies.sort();
        assert_eq!(
            policies,
            vec![
                AllocationPolicy::Manual,
                AllocationPolicy::Random,
                AllocationPolicy::Systematic
            ]
        );
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Manual".parse::<AllocationPolicy>(), Ok(AllocationPolicy::Manual));
        assert_eq!(
            "alternating".parse::<AllocationPolicy>(),
            Ok(AllocationPolicy::Systematic)
        );
        assert!("stratified".parse::<AllocationPolicy>().is_err());
    }
}
