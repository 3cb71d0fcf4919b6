//! Value type rule
//!
//! Checks feature `value_type` expressions against the grammar, then follows
//! any `ref:` through the resolver and re-checks the resolved expression.

use tracing::debug;

use super::{Rule, RuleCategory, RuleContext, RuleId, Violation};
use crate::type_expr::is_syntactically_valid;

/// Rule for validating type expressions and TypeRefs
pub struct TypeCheckRule;

impl TypeCheckRule {
    pub const ID: &'static str = "type-check";

    pub fn new() -> Self {
        Self
    }
}

impl Default for TypeCheckRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for TypeCheckRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Type check"
    }

    fn description(&self) -> &str {
        "value_type must be a valid type expression and every ref: must resolve within the tenant"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Type
    }

    fn evaluate(&self, context: &RuleContext<'_, '_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for row in context.rows.iter().filter(|r| r.is_feature()) {
            if !row.value_type.is_empty() && !is_syntactically_valid(&row.value_type) {
                violations.push(
                    Violation::error(
                        RuleId::TypeSyntaxInvalid,
                        format!("invalid value_type expression: {}", row.value_type),
                        row,
                    )
                    .at("value_type", row.value_type.clone()),
                );
                continue;
            }

            match context.resolver.resolve(&row.tenant_id, &row.value_type) {
                Err(err) => {
                    debug!(code = %row.code, rule_id = %err.rule_id(), "type_ref resolution failed");
                    violations.push(Violation::from_resolve_error(&err, row));
                }
                Ok(Some(resolved)) if !is_syntactically_valid(&resolved.resolved) => {
                    violations.push(
                        Violation::error(
                            RuleId::TypeRefResolvedInvalid,
                            format!("resolved value_type is invalid: {}", resolved.resolved),
                            row,
                        )
                        .at("value_type", row.value_type.clone()),
                    );
                }
                Ok(_) => {}
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
    fn test_valid_expressions_pass() {
        let rows = vec![
            feature("f.a", "attribute", "string"),
            feature("f.b", "attribute", "int | string"),
            feature("f.c", "object", "json<object:company.base>"),
            feature("f.d", "array", "json<array:string | company>"),
            feature("f.e", "attribute", "ref:f.a"),
        ];
        assert!(run(&TypeCheckRule::new(), &rows, GateMode::Import).is_empty());
    }

    #[test]
    fn test_syntax_invalid_skips_resolution() {
        let rows = vec![feature("f.a", "attribute", "varchar(20)")];
        let violations = run(&TypeCheckRule::new(), &rows, GateMode::Import);
        assert_eq!(ids(&violations), vec![RuleId::TypeSyntaxInvalid]);
        assert_eq!(violations[0].message, "invalid value_type expression: varchar(20)");
    }

    #[test]
    fn test_resolution_failure_reported_on_referrer() {
        let rows = vec![
            entity("company"),
            feature("f.a", "attribute", "ref:company"),
            feature("f.b", "attribute", "ref:f.missing"),
        ];
        let violations = run(&TypeCheckRule::new(), &rows, GateMode::Import);
        assert_eq!(
            ids(&violations),
            vec![RuleId::TypeRefTargetNotFeature, RuleId::TypeRefNotFound]
        );
        assert_eq!(violations[0].code, "f.a");
        assert_eq!(violations[0].field, "value_type");
        assert_eq!(violations[0].value, "ref:company");
    }

    #[test]
    fn test_resolved_expression_rechecked() {
        // The target's own syntax error is reported once on the target
        let rows = vec![
            feature("f.bad", "attribute", "varchar"),
            feature("f.a", "attribute", "ref:f.bad"),
        ];
        let violations = run(&TypeCheckRule::new(), &rows, GateMode::Import);
        assert_eq!(
            ids(&violations),
            vec![RuleId::TypeSyntaxInvalid, RuleId::TypeRefResolvedInvalid]
        );
        assert_eq!(violations[1].message, "resolved value_type is invalid: varchar");
        assert_eq!(violations[1].value, "ref:f.bad");
    }

    #[test]
    fn test_non_features_ignored() {
        let mut row = entity("company");
        row.value_type = "???".to_string();
        assert!(run(&TypeCheckRule::new(), &[row], GateMode::Import).is_empty());
    }
}
