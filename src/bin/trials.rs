use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};
use serde_json::json;

use allocseq::config::Config;
use allocseq::generator::{ManualStrategy, SequenceGenerator, DEFAULT_MAX_RUN_LENGTH};
use allocseq::logging::{log, obj, v_num, v_str, Domain, Level, ProfileScope};
use allocseq::policy::AllocationPolicy;
use allocseq::runs::longest_run;

#[derive(Clone, Copy)]
struct TrialConfig {
    policy: AllocationPolicy,
    strategy: ManualStrategy,
}

impl TrialConfig {
    fn name(&self) -> String {
        match self.policy {
            AllocationPolicy::Manual => format!("manual/{}", self.strategy.as_str()),
            other => other.as_str().to_string(),
        }
    }
}

#[derive(Default)]
struct TrialSummary {
    within_cap: u32,
    imbalance_sum: f64,
    longest_sum: f64,
    longest_max: usize,
}

fn run_trials(cfg: &Config, trial: TrialConfig, trials: u64) -> Result<TrialSummary> {
    let gen = SequenceGenerator::new().with_manual_strategy(trial.strategy);
    let mut summary = TrialSummary::default();
    for seed in 0..trials {
        let mut rng = StdRng::seed_from_u64(seed);
        let seq = gen.generate(trial.policy, cfg.sequence_length, &mut rng)?;
        let longest = longest_run(seq.labels());
        if longest <= DEFAULT_MAX_RUN_LENGTH {
            summary.within_cap += 1;
        }
        summary.imbalance_sum += seq.counts().imbalance() as f64;
        summary.longest_sum += longest as f64;
        summary.longest_max = summary.longest_max.max(longest);
    }
    Ok(summary)
}

fn main() -> Result<()> {
    let cfg = Config::from_env()?;
    let trials: u64 = std::env::var("TRIALS")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|&t: &u64| t > 0)
        .unwrap_or(1000);

    let make = |policy, strategy| TrialConfig { policy, strategy };
    let configs = [
        make(AllocationPolicy::Systematic, ManualStrategy::BalancedShuffle),
        make(AllocationPolicy::Manual, ManualStrategy::BalancedShuffle),
        make(AllocationPolicy::Manual, ManualStrategy::StreakBreak),
        make(AllocationPolicy::Random, ManualStrategy::BalancedShuffle),
    ];

    println!("policy,trials,within_cap_rate,mean_imbalance,mean_longest_run,max_longest_run");
    for trial in configs {
        let _scope = ProfileScope::with_context("trials", &[("policy", v_str(&trial.name()))]);
        let summary = run_trials(&cfg, trial, trials)?;
        let n = trials as f64;
        let within_rate = summary.within_cap as f64 / n;
        println!(
            "{},{},{:.4},{:.3},{:.3},{}",
            trial.name(),
            trials,
            within_rate,
            summary.imbalance_sum / n,
            summary.longest_sum / n,
            summary.longest_max
        );
        log(
            Level::Info,
            Domain::Generate,
            "trial_summary",
            obj(&[
                ("policy", v_str(&trial.name())),
                ("trials", json!(trials)),
                ("within_cap_rate", v_num(within_rate)),
                ("max_longest_run", json!(summary.longest_max)),
            ]),
        );
    }
    Ok(())
}
