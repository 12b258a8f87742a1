//! Plain-text views of sequences, statistics and the history ledger.

use crate::history::GenerationHistory;
use crate::label::{GroupCounts, Label, Sequence};
use crate::mock_stats::DEFAULT_ALPHA;
use crate::policy::AllocationPolicy;
use crate::runs::{RunStats, HISTOGRAM_BUCKETS};
use crate::session::Generation;

const BLOCK_A: char = '█';
const BLOCK_B: char = '░';

pub fn policy_title(policy: AllocationPolicy) -> &'static str {
    match policy {
        AllocationPolicy::Systematic => "Alternating allocation",
        AllocationPolicy::Manual => "Manual allocation",
        AllocationPolicy::Random => "Randomized allocation",
    }
}

/// Labels joined by single spaces.
pub fn sequence_line(seq: &Sequence) -> String {
    seq.to_string()
}

/// Horizontal bar per group, scaled so the larger group spans `width`.
pub fn count_bars(counts: GroupCounts, width: usize) -> String {
    let max = counts.a.max(counts.b).max(1);
    let mut out = String::new();
    for label in Label::BOTH {
        let count = counts.get(label);
        let len = (count * width + max / 2) / max;
        out.push_str(&format!("{} | {} {}\n", label, "#".repeat(len), count));
    }
    out
}

/// Sequence as rows of blocks, `columns` cells per row.
pub fn block_grid(seq: &Sequence, columns: usize) -> String {
    let columns = columns.max(1);
    let mut out = String::new();
    for row in seq.labels().chunks(columns) {
        for label in row {
            out.push(match label {
                Label::A => BLOCK_A,
                Label::B => BLOCK_B,
            });
        }
        out.push('\n');
    }
    out
}

pub fn run_histogram_table(stats: &RunStats) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:>5} {:>5} {:>5}\n", "run", "A", "B"));
    for i in 0..HISTOGRAM_BUCKETS {
        let len = if i == HISTOGRAM_BUCKETS - 1 {
            format!("{}+", i + 1)
        } else {
            (i + 1).to_string()
        };
        out.push_str(&format!(
            "{:>5} {:>5} {:>5}\n",
            len, stats.histogram.a[i], stats.histogram.b[i]
        ));
    }
    out
}

pub fn history_table(history: &GenerationHistory) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>4}  {:<10} {:>5} {:>5} {:>7} {:>7} {:>7}  {}\n",
        "gen", "policy", "A", "B", "longest", "effect", "p", "sig"
    ));
    for r in history.all() {
        out.push_str(&format!(
            "{:>4}  {:<10} {:>5} {:>5} {:>7} {:>7.3} {:>7.3}  {}\n",
            r.generation_id,
            r.policy.as_str(),
            r.count_a,
            r.count_b,
            r.run_stats.longest_run,
            r.mock_stats.effect_size,
            r.mock_stats.p_value,
            if r.mock_stats.is_significant(DEFAULT_ALPHA) { "*" } else { "" }
        ));
    }
    out
}

/// Per-policy panels for one generation; `only` restricts to one policy.
pub fn generation_report(
    generation: &Generation,
    grid_columns: usize,
    only: Option<AllocationPolicy>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "=== Generation {} (N={}) ===\n",
        generation.id,
        generation.sequences.systematic.len()
    ));
    for (policy, seq) in generation.sequences.iter() {
        if only.is_some_and(|p| p != policy) {
            continue;
        }
        out.push_str(&format!("\n--- {} ---\n", policy_title(policy)));
        out.push_str(&sequence_line(seq));
        out.push('\n');
        out.push_str(&count_bars(seq.counts(), 40));
        out.push_str(&block_grid(seq, grid_columns));
        if let Some(record) = generation.record(policy) {
            out.push_str(&format!("Longest run: {}\n", record.run_stats.longest_run));
            out.push_str(&format!(
                "Effect size: {:.3}  p-value: {:.3}\n",
                record.mock_stats.effect_size, record.mock_stats.p_value
            ));
            out.push_str(&run_histogram_table(&record.run_stats));
        }
    }
    out
}
