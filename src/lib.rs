//! Allocation-sequence generator and statistics engine.
//!
//! Shows how systematic, manual and random allocation behave over repeated
//! trials: each regenerate draws one sequence per policy, derives run-length
//! statistics and synthetic study outcomes, and appends them to a bounded
//! history for tabular display.

pub mod config;
pub mod error;
pub mod generator;
pub mod history;
pub mod label;
pub mod logging;
pub mod mock_stats;
pub mod policy;
pub mod render;
pub mod runs;
pub mod session;

pub use error::{AllocError, Result};
pub use label::{GroupCounts, Label, Sequence};
pub use policy::AllocationPolicy;
