//! Telemetry metric name constants.
//!
//! Centralised metric names for augur operations. Consumers install their
//! own `metrics` recorder (e.g. prometheus, statsd); without a recorder
//! installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `augur_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).

/// Total classification calls.
///
/// Labels: `template`, `outcome` ("parsed" | "fallback" | "error").
pub const CLASSIFICATIONS_TOTAL: &str = "augur_classifications_total";

/// Chat request duration in seconds, successful or not.
///
/// Labels: `provider`.
pub const REQUEST_DURATION_SECONDS: &str = "augur_request_duration_seconds";
