//! In-memory probe history.
//!
//! Holds the append-only sample log and the statistics derived from it.

mod models;
mod sample_log;
mod stats;

pub use models::*;
pub use sample_log::*;
pub use stats::*;
