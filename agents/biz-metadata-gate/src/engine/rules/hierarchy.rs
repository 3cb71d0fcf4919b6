//! Hierarchy rule
//!
//! Sources express the tree as `parent_code` rather than database ids, so
//! the check is static: the parent must exist in the same tenant and be a
//! dot-prefix of the child.

use super::{Rule, RuleCategory, RuleContext, RuleId, Violation};

pub struct HierarchyRule;

impl HierarchyRule {
    pub const ID: &'static str = "hierarchy";

    pub fn new() -> Self {
        Self
    }
}

impl Default for HierarchyRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for HierarchyRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Hierarchy"
    }

    fn description(&self) -> &str {
        "parent_code must exist in the same tenant and prefix the child's code"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Hierarchy
    }

    fn evaluate(&self, context: &RuleContext<'_, '_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for row in context.rows.iter().filter(|r| !r.parent_code.is_empty()) {
            if !context.index.contains(&row.tenant_id, &row.parent_code) {
                violations.push(
                    Violation::error(
                        RuleId::HierarchyParentMissing,
                        format!("parent_code not found in same tenant: {}", row.parent_code),
                        row,
                    )
                    .at("parent_code", row.parent_code.clone()),
                );
                continue;
            }

            let prefixed = row
                .code
                .strip_prefix(row.parent_code.as_str())
                .is_some_and(|rest| rest.starts_with('.'));
            if !prefixed {
                violations.push(
                    Violation::error(
                        RuleId::HierarchyParentPrefix,
                        "child code must start with parent_code + '.'",
                        row,
                    )
                    .at("parent_code", row.parent_code.clone()),
                );
            }
        }

        violations
    }
}
