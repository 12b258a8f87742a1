//! File sinks: with LOG_DIR set, records land under LOG_DIR/<run_id>/.
//!
//! Kept as the only test in this binary because the run context is
//! initialized once per process from the environment.

use std::fs;

use allocseq::config::Config;
use allocseq::session::AllocationSession;
use serde_json::Value;
use tempfile::TempDir;

#[test]
fn regenerate_writes_events_and_trace() {
    let dir = TempDir::new().unwrap();
    std::env::set_var("LOG_DIR", dir.path());
    std::env::set_var("RUN_ID", "sink-test");
    std::env::set_var("LOG_LEVEL", "trace");
    std::env::set_var("LOG_DOMAINS", "all");

    let cfg = Config {
        sequence_length: 40,
        seed: Some(5),
        ..Config::default()
    };
    let mut session = AllocationSession::new(&cfg);
    session.regenerate().unwrap();

    let run_dir = dir.path().join("sink-test");
    let manifest: Value =
        serde_json::from_str(&fs::read_to_string(run_dir.join("manifest.json")).unwrap()).unwrap();
    assert_eq!(manifest["run_id"], "sink-test");

    let events = fs::read_to_string(run_dir.join("events.jsonl")).unwrap();
    let regenerated: Vec<Value> = events
        .lines()
        .map(|l| serde_json::from_str::<Value>(l).unwrap())
        .filter(|v| v["event"] == "regenerated")
        .collect();
    assert_eq!(regenerated.len(), 1);
    assert_eq!(regenerated[0]["generation_id"], 1);
    assert_eq!(regenerated[0]["component"], "session");

    let trace = fs::read_to_string(run_dir.join("trace.jsonl")).unwrap();
    let fingerprints = trace
        .lines()
        .filter(|l| l.contains("\"sequence_fingerprint\""))
        .count();
    assert_eq!(fingerprints, 3);
}
