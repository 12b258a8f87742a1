//! Property-based checks over generator, analyzer and history invariants.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use allocseq::generator::{ManualPlan, ManualStrategy, SequenceGenerator, IMBALANCE_CHOICES};
use allocseq::runs::{analyze, longest_run, runs};
use allocseq::{AllocationPolicy, Label};

fn label_vec() -> impl Strategy<Value = Vec<Label>> {
    prop::collection::vec(prop_oneof![Just(Label::A), Just(Label::B)], 0..400)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_systematic_is_balanced(n in 1usize..1000, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let seq = SequenceGenerator::new()
            .generate(AllocationPolicy::Systematic, n, &mut rng)
            .unwrap();
        prop_assert_eq!(seq.len(), n);
        prop_assert!(seq.counts().imbalance() <= 1);
        prop_assert_eq!(seq.counts().a, (n + 1) / 2);
        if n >= 2 {
            prop_assert_eq!(longest_run(seq.labels()), 1);
        }
    }

    #[test]
    fn prop_manual_counts_match_plan(
        n in 1usize..800,
        seed in any::<u64>(),
        imbalance_idx in 0usize..IMBALANCE_CHOICES.len(),
        favor_a in any::<bool>(),
    ) {
        let plan = ManualPlan {
            imbalance: IMBALANCE_CHOICES[imbalance_idx],
            favored: if favor_a { Label::A } else { Label::B },
        };
        let mut rng = StdRng::seed_from_u64(seed);
        let seq = SequenceGenerator::new()
            .generate_manual_with_plan(n, plan, &mut rng)
            .unwrap();
        let target = plan.target_counts(n);
        prop_assert_eq!(target.total(), n);
        prop_assert_eq!(seq.counts(), target);
    }

    #[test]
    fn prop_every_policy_has_requested_length(n in 1usize..600, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        for gen in [
            SequenceGenerator::new(),
            SequenceGenerator::new().with_manual_strategy(ManualStrategy::StreakBreak),
        ] {
            for policy in AllocationPolicy::ALL {
                let seq = gen.generate(policy, n, &mut rng).unwrap();
                prop_assert_eq!(seq.len(), n);
                prop_assert_eq!(seq.counts().total(), n);
            }
        }
    }

    #[test]
    fn prop_histogram_accounts_for_every_label(labels in label_vec()) {
        let stats = analyze(&labels);
        let all_runs = runs(&labels);
        for label in Label::BOTH {
            let expected = all_runs.iter().filter(|r| r.label == label).count();
            prop_assert_eq!(stats.histogram.run_count(label), expected);
        }
        prop_assert_eq!(stats.histogram.total_length(), labels.len());
        prop_assert_eq!(stats.longest_run, longest_run(&labels));
    }

    #[test]
    fn prop_runs_are_maximal(labels in label_vec()) {
        let all_runs = runs(&labels);
        for pair in all_runs.windows(2) {
            prop_assert_ne!(pair[0].label, pair[1].label);
            prop_assert_eq!(pair[0].start + pair[0].len, pair[1].start);
        }
    }
}
