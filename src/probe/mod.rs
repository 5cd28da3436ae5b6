//! Probe module for reachability checks.
//!
//! A probe is one request against a fixed endpoint. Any failure to reach it
//! is recorded as a disconnected sample; the reason is not kept.

mod http;

pub use http::*;

use crate::history::Sample;

use async_trait::async_trait;
use thiserror::Error;

/// The single endpoint every probe targets.
pub const TARGET_URL: &str = "https://8.8.8.8";

/// Probe error types.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("target unreachable")]
    Unreachable,
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Performs one reachability check and reports it as a sample.
///
/// Implementations never fail: an unreachable target is a normal
/// disconnected observation.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self) -> Sample;
}
