//! Gate engine
//!
//! Orchestrates rule evaluation over a batch of rows. Each evaluation builds
//! its own [`RowIndex`], so one engine can gate independent batches
//! concurrently.

pub mod rules;

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{GateConfig, GateMode};
use crate::error::{GateError, Result};
use crate::report::{GateReport, RuleSummary};
use crate::resolver::{ResolveError, ResolvedType, RowIndex, TypeResolver};
use crate::row::Row;
use rules::{BoxedRule, Rule, RuleCategory, RuleContext};

/// The core gate engine
pub struct GateEngine {
    mode: GateMode,
    max_ref_depth: usize,
    /// Registered rules, in evaluation order
    rules: Vec<Arc<dyn Rule>>,
}

impl GateEngine {
    /// Create an engine with the default rule battery
    pub fn new(config: &GateConfig) -> Result<Self> {
        config.validate()?;
        let mut engine = Self::empty(config.mode, config.max_ref_depth);
        engine.register_default_rules();
        Ok(engine)
    }

    /// Create an engine from an untyped mode string
    ///
    /// Any mode other than `import`/`publish` is a construction error and
    /// never degrades into a violation.
    pub fn from_mode_str(mode: &str, max_ref_depth: usize) -> Result<Self> {
        let config = GateConfig::builder()
            .mode(mode.parse()?)
            .max_ref_depth(max_ref_depth)
            .build()?;
        Self::new(&config)
    }

    /// Create an engine without rules
    pub fn empty(mode: GateMode, max_ref_depth: usize) -> Self {
        Self {
            mode,
            max_ref_depth,
            rules: Vec::new(),
        }
    }

    fn register_default_rules(&mut self) {
        self.register(Arc::new(rules::required::RequiredFieldsRule::new()));
        self.register(Arc::new(rules::enum_check::EnumRule::new()));
        self.register(Arc::new(rules::code_format::CodeFormatRule::new()));
        self.register(Arc::new(rules::uniqueness::UniquenessRule::new()));
        self.register(Arc::new(rules::scope::ScopeRule::new()));
        self.register(Arc::new(rules::type_check::TypeCheckRule::new()));
        self.register(Arc::new(rules::unit::UnitRule::new()));
        self.register(Arc::new(rules::identifier::IdentifierRule::new()));
        self.register(Arc::new(rules::hierarchy::HierarchyRule::new()));
        // Publish gate
        self.register(Arc::new(rules::completeness::CompletenessRule::new()));
    }

    /// Register a rule at the end of the evaluation order
    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Register a boxed rule
    pub fn register_boxed(&mut self, rule: BoxedRule) {
        self.rules.push(Arc::from(rule));
    }

    pub fn mode(&self) -> GateMode {
        self.mode
    }

    pub fn max_ref_depth(&self) -> usize {
        self.max_ref_depth
    }

    /// All registered rules
    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    /// Rules that run in this engine's mode
    pub fn applicable_rules(&self) -> Vec<Arc<dyn Rule>> {
        self.rules
            .iter()
            .filter(|r| r.is_applicable(self.mode))
            .cloned()
            .collect()
    }

    /// Get rules by category
    pub fn rules_by_category(&self, category: RuleCategory) -> Vec<Arc<dyn Rule>> {
        self.rules
            .iter()
            .filter(|r| r.category() == category)
            .cloned()
            .collect()
    }

    /// Gate a batch
    ///
    /// Deterministic: the same rows in the same order always produce the
    /// same report. Rows are never modified.
    pub fn evaluate(&self, rows: &[Row]) -> GateReport {
        info!(mode = %self.mode, rows = rows.len(), "evaluating batch");

        let index = RowIndex::build(rows);
        let context = RuleContext::new(rows, &index, self.max_ref_depth, self.mode);

        let mut violations = Vec::new();
        let mut summaries = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            let evaluated = rule.is_applicable(self.mode);
            let found = if evaluated {
                rule.evaluate(&context)
            } else {
                Vec::new()
            };
            debug!(
                rule = rule.id(),
                evaluated,
                violations = found.len(),
                "rule evaluated"
            );

            summaries.push(RuleSummary {
                id: rule.id().to_string(),
                category: rule.category(),
                evaluated,
                violation_count: found.len(),
            });
            violations.extend(found);
        }

        let report = GateReport::new(self.mode, rows, summaries, violations);
        info!(
            mode = %self.mode,
            errors = report.error_count,
            warnings = report.warn_count,
            "batch evaluated"
        );
        report
    }

    /// Resolve one `value_type` against a batch, outside of rule evaluation
    pub fn resolve(
        &self,
        rows: &[Row],
        tenant_id: &str,
        value_type: &str,
    ) -> std::result::Result<Option<ResolvedType>, ResolveError> {
        let index = RowIndex::build(rows);
        TypeResolver::new(&index, self.max_ref_depth).resolve(tenant_id, value_type)
    }
}

impl TryFrom<&GateConfig> for GateEngine {
    type Error = GateError;

    fn try_from(config: &GateConfig) -> Result<Self> {
        Self::new(config)
    }
}
