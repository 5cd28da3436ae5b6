//! HTTP request handlers.

use super::AppState;
use crate::history::{Sample, Statistics};
use crate::monitor::PROBE_INTERVAL;

use axum::{
    extract::State,
    response::{Html, IntoResponse, Json},
};
use chrono::Local;
use serde::Serialize;

// ============================================================================
// Templates
// ============================================================================

const DASHBOARD_TEMPLATE: &str = include_str!("templates/dashboard.html");
const LAYOUT_TEMPLATE: &str = include_str!("templates/layout.html");

// ============================================================================
// Dashboard
// ============================================================================

pub async fn handle_dashboard(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.monitor.stats();

    let content = DASHBOARD_TEMPLATE
        .replace("{{uptime}}", &stats.uptime_label())
        .replace("{{downtime}}", &stats.downtime_label())
        .replace("{{avg_latency}}", &stats.avg_latency_label())
        .replace("{{refresh_ms}}", &PROBE_INTERVAL.as_millis().to_string());

    let page = LAYOUT_TEMPLATE
        .replace("{{title}}", "Internet Connection Monitor")
        .replace("{{content}}", &content);

    Html(page)
}

// ============================================================================
// API: Samples
// ============================================================================

/// The log as parallel chart series keyed by time labels.
#[derive(Debug, Serialize, PartialEq)]
pub struct SeriesResponse {
    pub labels: Vec<String>,
    pub connectivity: Vec<u8>,
    pub latency: Vec<f64>,
}

impl SeriesResponse {
    pub fn from_samples(samples: &[Sample]) -> Self {
        Self {
            labels: samples.iter().map(time_label).collect(),
            connectivity: samples.iter().map(|s| u8::from(s.is_connected())).collect(),
            latency: samples.iter().map(Sample::latency_ms).collect(),
        }
    }
}

fn time_label(sample: &Sample) -> String {
    sample
        .timestamp
        .with_timezone(&Local)
        .format("%H:%M:%S")
        .to_string()
}

/// Chart series together with the statistics of the same snapshot.
#[derive(Debug, Serialize)]
pub struct SamplesResponse {
    #[serde(flatten)]
    pub series: SeriesResponse,
    pub stats: StatsResponse,
}

pub async fn handle_get_samples(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.monitor.snapshot();
    Json(SamplesResponse {
        series: SeriesResponse::from_samples(&snapshot.samples),
        stats: StatsResponse::new(snapshot.stats, snapshot.samples.len()),
    })
}

// ============================================================================
// API: Statistics
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub uptime_pct: f64,
    pub downtime_pct: f64,
    pub avg_latency_ms: f64,
    pub uptime: String,
    pub downtime: String,
    pub avg_latency: String,
    pub samples: usize,
}

impl StatsResponse {
    fn new(stats: Statistics, samples: usize) -> Self {
        Self {
            uptime_pct: stats.uptime_pct,
            downtime_pct: stats.downtime_pct,
            avg_latency_ms: stats.avg_latency_ms,
            uptime: stats.uptime_label(),
            downtime: stats.downtime_label(),
            avg_latency: stats.avg_latency_label(),
            samples,
        }
    }
}

pub async fn handle_get_stats(State(state): State<AppState>) -> impl IntoResponse {
    // Both fields from one snapshot so they always agree.
    let snapshot = state.monitor.snapshot();
    Json(StatsResponse::new(snapshot.stats, snapshot.samples.len()))
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub running: bool,
    pub samples: usize,
    pub interval_ms: u64,
}

pub async fn handle_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatusResponse {
        running: state.monitor.is_running().await,
        samples: state.monitor.snapshot().samples.len(),
        interval_ms: PROBE_INTERVAL.as_millis() as u64,
    })
}

// ============================================================================
// Static Assets
// ============================================================================

pub async fn handle_favicon() -> impl IntoResponse {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
        <circle cx="50" cy="50" r="45" fill="#4bc0c0"/>
        <path d="M15 55 L35 55 L45 30 L55 75 L65 45 L85 45" stroke="white" stroke-width="6" fill="none"/>
    </svg>"##;

    (
        [(axum::http::header::CONTENT_TYPE, "image/svg+xml")],
        svg
    )
}
