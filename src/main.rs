use anyhow::Result;
use serde_json::json;

use allocseq::config::Config;
use allocseq::logging::{self, log, obj, v_str, Domain, Level};
use allocseq::render;
use allocseq::session::AllocationSession;

fn main() -> Result<()> {
    let cfg = Config::from_env()?;
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("run", v_str(logging::run_id())),
            ("config", json!(cfg)),
        ]),
    );

    let mut session = AllocationSession::new(&cfg);
    for _ in 0..cfg.generations.max(1) {
        session.regenerate()?;
    }

    if let Some(generation) = session.current() {
        let report = render::generation_report(generation, cfg.grid_columns, cfg.policy);
        println!("{}", report);
    }
    if cfg.history_json {
        println!("{}", session.history().to_json()?);
    } else {
        println!("=== History (newest first, capacity {}) ===", session.history().capacity());
        print!("{}", render::history_table(session.history()));
    }

    logging::log_session_summary(
        session.history().current_generation_id(),
        session.history().len(),
        session.sequence_length(),
        session.seed(),
    );
    Ok(())
}
