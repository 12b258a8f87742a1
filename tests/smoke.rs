//! End-to-end scenarios: generate, analyze and record the way the CLI does.

use rand::rngs::StdRng;
use rand::SeedableRng;

use allocseq::config::Config;
use allocseq::generator::{ManualPlan, SequenceGenerator};
use allocseq::runs::{analyze, longest_run};
use allocseq::session::AllocationSession;
use allocseq::{AllocError, AllocationPolicy, GroupCounts, Label};

fn session(n: usize, capacity: usize, seed: u64) -> AllocationSession {
    let cfg = Config {
        sequence_length: n,
        history_capacity: capacity,
        seed: Some(seed),
        ..Config::default()
    };
    AllocationSession::new(&cfg)
}

#[test]
fn systematic_200_alternates() {
    let mut rng = StdRng::seed_from_u64(0);
    let seq = SequenceGenerator::new()
        .generate(AllocationPolicy::Systematic, 200, &mut rng)
        .unwrap();
    for (i, label) in seq.iter().enumerate() {
        let expected = if i % 2 == 0 { Label::A } else { Label::B };
        assert_eq!(*label, expected, "position {}", i);
    }
    let stats = analyze(seq.labels());
    assert_eq!(stats.longest_run, 1);
    assert_eq!(seq.counts(), GroupCounts::new(100, 100));
}

#[test]
fn manual_200_balanced_plan_caps_runs() {
    let gen = SequenceGenerator::new();
    let plan = ManualPlan {
        imbalance: 0,
        favored: Label::A,
    };
    let seeds = 100;
    let mut within_cap = 0;
    for seed in 0..seeds {
        let mut rng = StdRng::seed_from_u64(seed);
        let seq = gen.generate_manual_with_plan(200, plan, &mut rng).unwrap();
        assert_eq!(seq.counts(), GroupCounts::new(100, 100));
        if longest_run(seq.labels()) <= 3 {
            within_cap += 1;
        }
    }
    assert!(within_cap >= 95, "only {} of {} seeds kept runs <= 3", within_cap, seeds);
}

#[test]
fn six_regenerations_keep_last_five_generations() {
    let mut s = session(200, 15, 7);
    for _ in 0..6 {
        s.regenerate().unwrap();
    }
    let history = s.history();
    assert_eq!(history.len(), 15);
    assert_eq!(history.generation_ids(), vec![6, 5, 4, 3, 2]);
    assert_eq!(history.current_generation_id(), 6);
    assert_eq!(history.next_generation_id(), 7);
}

#[test]
fn history_size_tracks_regenerations() {
    for capacity in [1, 4, 15, 30] {
        let mut s = session(60, capacity, 3);
        for k in 1..=12usize {
            s.regenerate().unwrap();
            let records = s.history().all();
            assert_eq!(records.len(), (3 * k).min(capacity));
            for pair in records.windows(2) {
                let (x, y) = (&pair[0], &pair[1]);
                assert!(
                    x.generation_id > y.generation_id
                        || (x.generation_id == y.generation_id && x.policy < y.policy)
                );
            }
        }
    }
}

#[test]
fn current_generation_matches_newest_records() {
    let mut s = session(300, 15, 11);
    s.regenerate().unwrap();
    s.regenerate().unwrap();
    let generation = s.current().unwrap();
    assert_eq!(generation.id, 2);
    let newest = s.history().current_records();
    assert_eq!(newest.len(), 3);
    for record in newest {
        let seq = generation.sequences.get(record.policy);
        assert_eq!(record.counts(), seq.counts());
        assert_eq!(record.run_stats.longest_run, longest_run(seq.labels()));
        assert_eq!(record.count_a + record.count_b, 300);
    }
}

#[test]
fn invalid_length_is_rejected_before_generation() {
    let mut s = session(0, 15, 1);
    let err = s.regenerate().unwrap_err();
    assert!(matches!(err, AllocError::InvalidArgument(_)));
    assert!(s.history().is_empty());

    let bad = Config::from_lookup(|key| (key == "SEQ_LEN").then(|| "150.5".to_string()));
    assert!(matches!(bad, Err(AllocError::InvalidArgument(_))));
}
