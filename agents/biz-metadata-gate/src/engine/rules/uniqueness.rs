//! Batch-level uniqueness of `(tenant_id, code)`
//!
//! Only the current input batch is checked; historical rows and soft
//! deletes are the database's concern.

use std::collections::HashSet;

use super::{Rule, RuleCategory, RuleContext, RuleId, Violation};

/// Rule for detecting repeated `(tenant_id, code)` keys
pub struct UniquenessRule;

impl UniquenessRule {
    pub const ID: &'static str = "unique-tenant-code";

    pub fn new() -> Self {
        Self
    }
}

impl Default for UniquenessRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for UniquenessRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Unique tenant code"
    }

    fn description(&self) -> &str {
        "(tenant_id, code) must not repeat within the input batch"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Uniqueness
    }

    fn evaluate(&self, context: &RuleContext<'_, '_>) -> Vec<Violation> {
        let mut seen = HashSet::new();
        let mut violations = Vec::new();

        for row in context.rows {
            if row.tenant_id.is_empty() || row.code.is_empty() {
                continue;
            }
            // The first occurrence is accepted, every repeat is reported
            if !seen.insert((row.tenant_id.as_str(), row.code.as_str())) {
                violations.push(
                    Violation::error(
                        RuleId::UniqueTenantCode,
                        "duplicate (tenant_id, code) in input batch",
                        row,
                    )
                    .at("code", row.code.clone()),
                );
            }
        }

        violations
    }
}
