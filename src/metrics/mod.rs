//! Prometheus metrics for the rank tracker
//!
//! Tracks contributor traffic (work requests, accepted captures, active
//! workers) and parse batch outcomes.
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization fails, metrics operations become no-ops.

use prometheus::{
    register_counter, register_counter_vec, register_gauge, register_histogram, Counter,
    CounterVec, Encoder, Gauge, Histogram, TextEncoder,
};
use std::sync::OnceLock;

// ============================================================================
// Metrics Storage
// ============================================================================

struct RankMetrics {
    captures_accepted: Counter,
    work_requests: Counter,
    active_workers: Gauge,
    parse_outcomes: CounterVec,
    parse_batch_duration: Histogram,
}

static RANK_METRICS: OnceLock<RankMetrics> = OnceLock::new();

/// Flag to track if initialization was attempted
static METRICS_INIT_ATTEMPTED: OnceLock<bool> = OnceLock::new();

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// Safe to call more than once; only the first call registers.
///
/// ```ignore
/// if let Err(e) = rankwatch::metrics::init_metrics() {
///     tracing::warn!(error = %e, "Metrics disabled");
/// }
/// ```
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_INIT_ATTEMPTED.get().is_some() {
        return Ok(());
    }
    METRICS_INIT_ATTEMPTED.set(true).ok();

    let metrics = RankMetrics {
        captures_accepted: register_counter!(
            "rankwatch_captures_accepted_total",
            "Total result pages accepted from contributors"
        )?,
        work_requests: register_counter!(
            "rankwatch_work_requests_total",
            "Total work requests served to contributors"
        )?,
        active_workers: register_gauge!(
            "rankwatch_active_workers",
            "Distinct contributors seen in the activity window"
        )?,
        parse_outcomes: register_counter_vec!(
            "rankwatch_parse_outcomes_total",
            "Parsed captures by outcome",
            &["outcome"]
        )?,
        parse_batch_duration: register_histogram!(
            "rankwatch_parse_batch_duration_seconds",
            "Time spent parsing one batch of pending captures",
            vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0]
        )?,
    };

    RANK_METRICS
        .set(metrics)
        .map_err(|_| "Rank metrics already initialized")?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Check if metrics have been initialized
pub fn metrics_initialized() -> bool {
    RANK_METRICS.get().is_some()
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

pub fn record_capture_accepted() {
    if let Some(m) = RANK_METRICS.get() {
        m.captures_accepted.inc();
    }
}

pub fn record_work_request() {
    if let Some(m) = RANK_METRICS.get() {
        m.work_requests.inc();
    }
}

pub fn set_active_workers(count: usize) {
    if let Some(m) = RANK_METRICS.get() {
        m.active_workers.set(count as f64);
    }
}

/// Record one parse outcome (`parsed`, `empty`, `captcha`, ...)
pub fn record_parse_outcome(outcome: &str) {
    if let Some(m) = RANK_METRICS.get() {
        m.parse_outcomes.with_label_values(&[outcome]).inc();
    }
}

/// Histogram timer guard that records duration on drop
pub struct MetricsTimer {
    timer: Option<prometheus::HistogramTimer>,
}

impl Drop for MetricsTimer {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop_and_record();
        }
    }
}

/// Start timing a parse batch
pub fn start_parse_batch_timer() -> MetricsTimer {
    MetricsTimer {
        timer: RANK_METRICS
            .get()
            .map(|m| m.parse_batch_duration.start_timer()),
    }
}

// ============================================================================
// Tests
// ============================================================================
