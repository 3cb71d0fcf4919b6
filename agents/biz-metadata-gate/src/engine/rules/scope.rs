//! Object scope rule
//!
//! Only features carry type information:
//! - `object_type != feature` => `data_class`, `value_type`, `unit` empty
//! - `object_type = feature`  => `data_class` and `value_type` filled

use super::{Rule, RuleCategory, RuleContext, RuleId, Violation};

/// Rule for validating which rows may declare types
pub struct ScopeRule;

impl ScopeRule {
    pub const ID: &'static str = "scope";

    pub fn new() -> Self {
        Self
    }
}

impl Default for ScopeRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for ScopeRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Feature scope"
    }

    fn description(&self) -> &str {
        "non-feature rows keep data_class/value_type/unit empty; features must declare data_class and value_type"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Scope
    }

    fn evaluate(&self, context: &RuleContext<'_, '_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for row in context.rows {
            if !row.is_feature() {
                if !row.data_class.is_empty() || !row.value_type.is_empty() || !row.unit.is_empty() {
                    violations.push(
                        Violation::error(
                            RuleId::ScopeNonFeatureHasType,
                            "object_type != feature must keep data_class/value_type/unit empty",
                            row,
                        )
                        .at(
                            "data_class/value_type/unit",
                            format!("{}|{}|{}", row.data_class, row.value_type, row.unit),
                        ),
                    );
                }
            } else if row.data_class.is_empty() || row.value_type.is_empty() {
                violations.push(
                    Violation::error(
                        RuleId::ScopeFeatureMissingType,
                        "object_type=feature must have non-empty data_class and value_type",
                        row,
                    )
                    .at(
                        "data_class/value_type",
                        format!("{}|{}", row.data_class, row.value_type),
                    ),
                );
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{entity, feature, ids, run};
    use super::*;
    use crate::config::GateMode;

    #[test]
    fn test_non_feature_with_type_fields() {
        let mut row = entity("company");
        row.data_class = "attribute".to_string();
        row.unit = "kg".to_string();

        let violations = run(&ScopeRule::new(), &[row], GateMode::Import);
        assert_eq!(ids(&violations), vec![RuleId::ScopeNonFeatureHasType]);
        assert_eq!(violations[0].value, "attribute||kg");
    }

    #[test]
    fn test_feature_missing_type() {
        let rows = vec![
            feature("f.a", "", "string"),
            feature("f.b", "attribute", ""),
            feature("f.c", "attribute", "string"),
        ];
        let violations = run(&ScopeRule::new(), &rows, GateMode::Import);
        assert_eq!(ids(&violations), vec![RuleId::ScopeFeatureMissingType; 2]);
    }

    #[test]
    fn test_clean_entity_passes() {
        assert!(run(&ScopeRule::new(), &[entity("company")], GateMode::Import).is_empty());
    }
}
