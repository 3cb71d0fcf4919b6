//! Gate report
//!
//! The report is the only output of an evaluation. Its JSON shape is consumed
//! by CI and downstream aggregation, so field names are stable.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::GateMode;
use crate::engine::rules::{RuleCategory, RuleId, Severity, Violation};
use crate::row::{Row, COLUMNS};

/// Per-rule outcome of one evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSummary {
    pub id: String,
    pub category: RuleCategory,
    /// False when the rule does not run in the report's mode
    pub evaluated: bool,
    pub violation_count: usize,
}

/// Result of gating one batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateReport {
    pub mode: GateMode,
    /// Input paths as given by the caller
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<String>,
    /// Files actually read after directory expansion
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resolved_inputs: Vec<String>,
    pub row_count: usize,
    pub violation_count: usize,
    pub error_count: usize,
    pub warn_count: usize,
    /// SHA-256 over the normalized rows, in input order
    pub batch_digest: String,
    #[serde(default)]
    pub rules: Vec<RuleSummary>,
    pub violations: Vec<Violation>,
}

impl GateReport {
    pub fn new(mode: GateMode, rows: &[Row], rules: Vec<RuleSummary>, violations: Vec<Violation>) -> Self {
        let error_count = violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
            .count();
        let warn_count = violations
            .iter()
            .filter(|v| v.severity == Severity::Warn)
            .count();

        Self {
            mode,
            inputs: Vec::new(),
            resolved_inputs: Vec::new(),
            row_count: rows.len(),
            violation_count: violations.len(),
            error_count,
            warn_count,
            batch_digest: batch_digest(rows),
            rules,
            violations,
        }
    }

    /// Attach the input paths the batch was loaded from
    pub fn with_inputs<I, J>(mut self, inputs: I, resolved: J) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        J: IntoIterator,
        J::Item: Into<String>,
    {
        self.inputs = inputs.into_iter().map(Into::into).collect();
        self.resolved_inputs = resolved.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the batch passes the gate
    ///
    /// ERRORs always fail; WARNs fail only with `fail_on_warn`.
    pub fn passed(&self, fail_on_warn: bool) -> bool {
        self.error_count == 0 && (!fail_on_warn || self.warn_count == 0)
    }

    /// Violations reported by one rule id
    pub fn violations_for(&self, rule_id: RuleId) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.rule_id == rule_id)
    }
}

/// Stable fingerprint of a batch
///
/// Every column is hashed in a fixed order with unit/record separators, so
/// the digest only changes when normalized content or row order changes.
pub fn batch_digest(rows: &[Row]) -> String {
    let mut hasher = Sha256::new();

    for row in rows {
        for column in COLUMNS {
            if let Some(value) = row.field(column) {
                hasher.update(value.as_bytes());
            }
            hasher.update([0x1f]);
        }
        hasher.update([0x1e]);
    }

    hex::encode(hasher.finalize())
}
