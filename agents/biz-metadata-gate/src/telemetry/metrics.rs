//! Prometheus metrics for the metadata gate
//!
//! - `biz_metadata_gate_runs_total` (counter) - gate runs by mode and result
//! - `biz_metadata_gate_rows_evaluated_total` (counter) - rows by mode
//! - `biz_metadata_gate_violations_total` (counter) - violations by rule id and severity
//! - `biz_metadata_gate_rule_evaluations_total` (counter) - rule outcomes
//! - `biz_metadata_gate_evaluation_duration_seconds` (histogram) - by mode
//!
//! # Example
//!
//! ```rust,no_run
//! use biz_metadata_gate::telemetry::GateMetricsRegistry;
//!
//! let registry = GateMetricsRegistry::new().unwrap();
//! registry.gate().record_run("import", true);
//! registry.gate().observe_duration("import", 0.012);
//! let text = registry.encode_text().unwrap();
//! ```

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry};
use std::sync::Arc;

use super::{Result, TelemetryError};
use crate::report::GateReport;

const NAMESPACE: &str = "biz_metadata_gate";

/// Gate metrics for Prometheus
pub struct GateMetrics {
    /// Gate runs (by mode, result)
    runs_total: CounterVec,

    /// Rows evaluated (by mode)
    rows_evaluated_total: CounterVec,

    /// Violations (by rule_id, severity)
    violations_total: CounterVec,

    /// Rule evaluations (by rule, result)
    rule_evaluations_total: CounterVec,

    /// Evaluation duration in seconds (by mode)
    duration_seconds: HistogramVec,
}

impl GateMetrics {
    /// Create the metrics and register them with the provided registry
    pub fn new(registry: Arc<Registry>) -> Result<Self> {
        let runs_total = CounterVec::new(
            Opts::new("runs_total", "Total number of gate runs").namespace(NAMESPACE),
            &["mode", "result"],
        )?;

        let rows_evaluated_total = CounterVec::new(
            Opts::new("rows_evaluated_total", "Total number of rows evaluated")
                .namespace(NAMESPACE),
            &["mode"],
        )?;

        let violations_total = CounterVec::new(
            Opts::new("violations_total", "Total number of violations by rule")
                .namespace(NAMESPACE),
            &["rule_id", "severity"],
        )?;

        let rule_evaluations_total = CounterVec::new(
            Opts::new("rule_evaluations_total", "Total number of rule evaluations")
                .namespace(NAMESPACE),
            &["rule", "result"],
        )?;

        let duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "evaluation_duration_seconds",
                "Batch evaluation duration in seconds",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
            &["mode"],
        )?;

        registry.register(Box::new(runs_total.clone()))?;
        registry.register(Box::new(rows_evaluated_total.clone()))?;
        registry.register(Box::new(violations_total.clone()))?;
        registry.register(Box::new(rule_evaluations_total.clone()))?;
        registry.register(Box::new(duration_seconds.clone()))?;

        Ok(Self {
            runs_total,
            rows_evaluated_total,
            violations_total,
            rule_evaluations_total,
            duration_seconds,
        })
    }

    /// Record a gate run
    pub fn record_run(&self, mode: &str, passed: bool) {
        let result = if passed { "passed" } else { "failed" };
        self.runs_total.with_label_values(&[mode, result]).inc();
    }

    pub fn record_rows(&self, mode: &str, rows: usize) {
        self.rows_evaluated_total
            .with_label_values(&[mode])
            .inc_by(rows as f64);
    }

    pub fn record_violation(&self, rule_id: &str, severity: &str) {
        self.violations_total
            .with_label_values(&[rule_id, severity])
            .inc();
    }

    /// Record a rule outcome; `skipped` when the rule does not apply to the mode
    pub fn record_rule_evaluation(&self, rule: &str, result: &str) {
        self.rule_evaluations_total
            .with_label_values(&[rule, result])
            .inc();
    }

    pub fn observe_duration(&self, mode: &str, duration_secs: f64) {
        self.duration_seconds
            .with_label_values(&[mode])
            .observe(duration_secs);
    }

    /// Record everything a report carries
    pub fn record_report(&self, report: &GateReport, fail_on_warn: bool) {
        let mode = report.mode.as_str();
        self.record_run(mode, report.passed(fail_on_warn));
        self.record_rows(mode, report.row_count);

        for violation in &report.violations {
            self.record_violation(violation.rule_id.as_str(), violation.severity.as_str());
        }

        for rule in &report.rules {
            let result = match (rule.evaluated, rule.violation_count) {
                (false, _) => "skipped",
                (true, 0) => "passed",
                (true, _) => "failed",
            };
            self.record_rule_evaluation(&rule.id, result);
        }
    }
}

/// Registry for all gate metrics
pub struct GateMetricsRegistry {
    registry: Arc<Registry>,
    gate: GateMetrics,
}

impl GateMetricsRegistry {
    /// Create a new metrics registry
    pub fn new() -> Result<Self> {
        Self::with_registry(Arc::new(Registry::new()))
    }

    /// Create with an existing Prometheus registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let gate = GateMetrics::new(Arc::clone(&registry))?;
        Ok(Self { registry, gate })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    /// Get gate metrics
    pub fn gate(&self) -> &GateMetrics {
        &self.gate
    }

    /// Gather all metrics in Prometheus format
    pub fn gather(&self) -> Vec<prometheus::proto::MetricFamily> {
        self.registry.gather()
    }

    /// Encode metrics in the text exposition format
    pub fn encode_text(&self) -> Result<String> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::EncodingFailed(e.to_string()))
    }
}
