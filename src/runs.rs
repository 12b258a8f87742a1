//! Run-length analysis over label sequences.
//!
//! A run is a maximal block of identical labels. Everything here is a pure
//! single pass over the input.

use serde::{Deserialize, Serialize};

use crate::label::Label;

/// Number of histogram buckets; the last one collects every run of this length or longer.
pub const HISTOGRAM_BUCKETS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub label: Label,
    pub start: usize,
    pub len: usize,
}

/// Run counts by length, per label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunHistogram {
    pub a: [usize; HISTOGRAM_BUCKETS],
    pub b: [usize; HISTOGRAM_BUCKETS],
    /// Summed length of the runs that landed in the last bucket, per label.
    pub overflow_len: [usize; 2],
}

impl RunHistogram {
    pub fn record(&mut self, run: &Run) {
        if run.len == 0 {
            return;
        }
        let bucket = run.len.min(HISTOGRAM_BUCKETS) - 1;
        self.buckets_mut(run.label)[bucket] += 1;
        if bucket == HISTOGRAM_BUCKETS - 1 {
            self.overflow_len[run.label.index()] += run.len;
        }
    }

    pub fn buckets(&self, label: Label) -> &[usize; HISTOGRAM_BUCKETS] {
        match label {
            Label::A => &self.a,
            Label::B => &self.b,
        }
    }

    fn buckets_mut(&mut self, label: Label) -> &mut [usize; HISTOGRAM_BUCKETS] {
        match label {
            Label::A => &mut self.a,
            Label::B => &mut self.b,
        }
    }

    pub fn run_count(&self, label: Label) -> usize {
        self.buckets(label).iter().sum()
    }

    /// Labels covered by runs of `label`.
    pub fn length_of(&self, label: Label) -> usize {
        let exact: usize = self.buckets(label)[..HISTOGRAM_BUCKETS - 1]
            .iter()
            .enumerate()
            .map(|(i, count)| (i + 1) * count)
            .sum();
        exact + self.overflow_len[label.index()]
    }

    /// Sum of length x count over both labels; equals the sequence length.
    pub fn total_length(&self) -> usize {
        self.length_of(Label::A) + self.length_of(Label::B)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub longest_run: usize,
    pub histogram: RunHistogram,
}

/// Split a sequence into its maximal runs.
pub fn runs(labels: &[Label]) -> Vec<Run> {
    let mut out = Vec::new();
    let mut iter = labels.iter().copied().enumerate();
    let Some((_, first)) = iter.next() else {
        return out;
    };
    let mut current = Run {
        label: first,
        start: 0,
        len: 1,
    };
    for (i, label) in iter {
        if label == current.label {
            current.len += 1;
        } else {
            out.push(current);
            current = Run {
                label,
                start: i,
                len: 1,
            };
        }
    }
    out.push(current);
    out
}

/// Length of the longest run; 0 for an empty sequence.
pub fn longest_run(labels: &[Label]) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for (i, label) in labels.iter().enumerate() {
        if i > 0 && labels[i - 1] == *label {
            current += 1;
        } else {
            current = 1;
        }
        longest = longest.max(current);
    }
    longest
}

pub fn analyze(labels: &[Label]) -> RunStats {
    let mut stats = RunStats::default();
    for run in runs(labels) {
        stats.longest_run = stats.longest_run.max(run.len);
        stats.histogram.record(&run);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use Label::{A, B};

    #[test]
    fn test_longest_run_boundaries() {
        assert_eq!(longest_run(&[]), 0);
        assert_eq!(longest_run(&[A]), 1);
        assert_eq!(longest_run(&[A, B, A, B]), 1);
        assert_eq!(longest_run(&[A, B, B, B, A, A]), 3);
        assert_eq!(longest_run(&[B, B, B, B]), 4);
    }

    #[test]
    fn test_runs_split() {
        let r = runs(&[A, A, B, A, A, A]);
        assert_eq!(
            r,
            vec![
                Run { label: A, start: 0, len: 2 },
                Run { label: B, start: 2, len: 1 },
                Run { label: A, start: 3, len: 3 },
            ]
        );
        assert!(runs(&[]).is_empty());
    }

    #[test]
    fn test_analyze_histogram() {
        let labels = [A, A, B, A, A, A, B, B];
        let stats = analyze(&labels);
        assert_eq!(stats.longest_run, 3);
        assert_eq!(stats.histogram.a[1], 1);
        assert_eq!(stats.histogram.a[2], 1);
        assert_eq!(stats.histogram.b[0], 1);
        assert_eq!(stats.histogram.b[1], 1);
        assert_eq!(stats.histogram.run_count(A), 2);
        assert_eq!(stats.histogram.run_count(B), 2);
        assert_eq!(stats.histogram.total_length(), labels.len());
    }

    #[test]
    fn test_long_runs_share_last_bucket() {
        let mut labels = vec![A; 12];
        labels.extend(vec![B; 10]);
        labels.push(A);
        let stats = analyze(&labels);
        assert_eq!(stats.longest_run, 12);
        assert_eq!(stats.histogram.a[9], 1);
        assert_eq!(stats.histogram.a[0], 1);
        assert_eq!(stats.histogram.b[9], 1);
        assert_eq!(stats.histogram.overflow_len, [12, 10]);
        assert_eq!(stats.histogram.total_length(), 23);
    }

    #[test]
    fn test_analyze_empty() {
        let stats = analyze(&[]);
        assert_eq!(stats.longest_run, 0);
        assert_eq!(stats.histogram.total_length(), 0);
    }
}
