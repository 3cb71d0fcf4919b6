//! Required field rules
//!
//! Every row, whatever its object type, must carry the identity and
//! lifecycle columns, and a positive `version`.

use super::{Rule, RuleCategory, RuleContext, RuleId, Violation};

/// Columns that must be non-empty on every row
pub const REQUIRED_COLUMNS: [&str; 6] = ["tenant_id", "code", "name", "object_type", "status", "source"];

/// Rule for validating required columns and the version number
pub struct RequiredFieldsRule;

impl RequiredFieldsRule {
    pub const ID: &'static str = "basic-required";

    pub fn new() -> Self {
        Self
    }
}

impl Default for RequiredFieldsRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for RequiredFieldsRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Required fields"
    }

    fn description(&self) -> &str {
        "tenant_id, code, name, object_type, status and source must be filled; version must be a positive integer"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Required
    }

    fn evaluate(&self, context: &RuleContext<'_, '_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for row in context.rows {
            for column in REQUIRED_COLUMNS {
                let value = row.field(column).unwrap_or_default();
                if value.is_empty() {
                    violations.push(
                        Violation::error(
                            RuleId::BasicRequiredMissing,
                            format!("missing required field: {}", column),
                            row,
                        )
                        .at(column, value),
                    );
                }
            }

            if row.version <= 0 {
                violations.push(
                    Violation::error(
                        RuleId::BasicVersionInvalid,
                        "version must be positive integer",
                        row,
                    )
                    .at("version", row.version.to_string()),
                );
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{feature, ids, run};
    use super::*;
    use crate::config::GateMode;
    use crate::row::Row;

    #[test]
    fn test_complete_row_passes() {
        let rows = vec![feature("f.x", "attribute", "string")];
        assert!(run(&RequiredFieldsRule::new(), &rows, GateMode::Import).is_empty());
    }

    #[test]
    fn test_missing_fields_reported_individually() {
        let rows = vec![Row::from_pairs([
            ("tenant_id", "t1"),
            ("code", "f.x"),
            ("version", "1"),
            ("object_type", "feature"),
            ("status", "null"),
        ])];
        let violations = run(&RequiredFieldsRule::new(), &rows, GateMode::Import);
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "status", "source"]);
        assert!(violations
            .iter()
            .all(|v| v.rule_id == RuleId::BasicRequiredMissing));
    }

    #[test]
    fn test_version_must_be_positive() {
        let mut row = feature("f.x", "attribute", "string");
        row.version = 0;
        let violations = run(&RequiredFieldsRule::new(), &[row], GateMode::Import);
        assert_eq!(ids(&violations), vec![RuleId::BasicVersionInvalid]);
        assert_eq!(violations[0].value, "0");
    }
}
