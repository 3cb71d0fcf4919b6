//! Identifier feature rules
//!
//! Identifiers are join keys, so they are held to a strict shape:
//! - resolved `value_type` in `{string, int, int|string}`, term order ignored
//! - no unit
//! - code named `*.id.<id_type>`

use std::collections::BTreeSet;

use super::{Rule, RuleCategory, RuleContext, RuleId, Violation};
use crate::row::Row;
use crate::type_expr::{canonical_union, is_identifier_code, split_union_terms, IDENTIFIER_ALLOWED};

/// Rule for validating `data_class = identifier` features
pub struct IdentifierRule;

impl IdentifierRule {
    pub const ID: &'static str = "identifier";

    pub fn new() -> Self {
        Self
    }
}

impl Default for IdentifierRule {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse unions made only of `int` and `string` to their canonical spelling
///
/// `string|int` becomes `int|string`, `int|int` becomes `int`. Anything else
/// is returned with union whitespace removed.
pub fn normalize_identifier_type(expr: &str) -> String {
    let canonical = canonical_union(expr.trim());
    let Some(terms) = split_union_terms(&canonical) else {
        return canonical;
    };

    let set: BTreeSet<&str> = terms.into_iter().collect();
    if set.iter().all(|t| *t == "int" || *t == "string") {
        // BTreeSet order is already int < string
        return set.into_iter().collect::<Vec<_>>().join("|");
    }
    canonical
}

fn allowed_message() -> String {
    let mut allowed = IDENTIFIER_ALLOWED.to_vec();
    allowed.sort_unstable();
    let quoted: Vec<String> = allowed.iter().map(|t| format!("'{t}'")).collect();
    format!(
        "identifier value_type must be one of [{}] (after ref resolution)",
        quoted.join(", ")
    )
}

fn is_identifier(row: &Row) -> bool {
    row.is_feature() && row.data_class == "identifier"
}

impl Rule for IdentifierRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Identifier"
    }

    fn description(&self) -> &str {
        "identifier features resolve to string/int/int|string, have no unit and are named *.id.<id_type>"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Identifier
    }

    fn evaluate(&self, context: &RuleContext<'_, '_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for row in context.rows.iter().filter(|r| is_identifier(r)) {
            let resolved = match context.resolver.resolve(&row.tenant_id, &row.value_type) {
                Ok(resolved) => resolved,
                Err(err) => {
                    violations.push(
                        Violation::from_resolve_error(&err, row)
                            .at("value_type", row.value_type.clone()),
                    );
                    continue;
                }
            };

            let effective = resolved
                .map(|r| r.resolved)
                .unwrap_or_else(|| row.value_type.clone());
            let normalized = normalize_identifier_type(&effective);

            if !IDENTIFIER_ALLOWED.contains(&normalized.as_str()) {
                violations.push(
                    Violation::error(RuleId::IdentifierValueType, allowed_message(), row)
                        .at("value_type", row.value_type.clone()),
                );
            }
            if !row.unit.is_empty() {
                violations.push(
                    Violation::error(
                        RuleId::IdentifierUnitNotEmpty,
                        "identifier unit must be empty",
                        row,
                    )
                    .at("unit", row.unit.clone()),
                );
            }
            if !is_identifier_code(&row.code) {
                violations.push(
                    Violation::error(
                        RuleId::IdentifierCodePattern,
                        "identifier code must match *.id.<id_type>",
                        row,
                    )
                    .at("code", row.code.clone()),
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

    #[test]
    fn test_normalize_identifier_type() {
        assert_eq!(normalize_identifier_type("string | int"), "int|string");
        assert_eq!(normalize_identifier_type("int|string"), "int|string");
        assert_eq!(normalize_identifier_type("int|int"), "int");
        assert_eq!(normalize_identifier_type("string|string"), "string");
        assert_eq!(normalize_identifier_type("int|decimal"), "int|decimal");
        assert_eq!(normalize_identifier_type(" decimal "), "decimal");
    }

    #[test]
    fn test_valid_identifiers() {
        let rows = vec![
            feature("company.id.uscc", "identifier", "string"),
            feature("company.id.seq", "identifier", "int"),
            feature("company.id.any", "identifier", "string|int"),
        ];
        assert!(run(&IdentifierRule::new(), &rows, GateMode::Import).is_empty());
    }

    #[test]
    fn test_invalid_type_and_code() {
        let rows = vec![feature("f.x", "identifier", "decimal")];
        let violations = run(&IdentifierRule::new(), &rows, GateMode::Import);
        assert_eq!(
            ids(&violations),
            vec![RuleId::IdentifierValueType, RuleId::IdentifierCodePattern]
        );
        assert_eq!(
            violations[0].message,
            "identifier value_type must be one of ['int', 'int|string', 'string'] (after ref resolution)"
        );
    }

    #[test]
    fn test_type_checked_after_resolution() {
        let rows = vec![
            feature("base.code", "attribute", "string"),
            feature("base.amount", "metric", "decimal"),
            feature("company.id.code", "identifier", "ref:base.code"),
            feature("company.id.amount", "identifier", "ref:base.amount"),
        ];
        let violations = run(&IdentifierRule::new(), &rows, GateMode::Import);
        assert_eq!(ids(&violations), vec![RuleId::IdentifierValueType]);
        assert_eq!(violations[0].code, "company.id.amount");
        assert_eq!(violations[0].value, "ref:base.amount");
    }

    #[test]
    fn test_unit_must_be_empty() {
        let mut row = feature("company.id.uscc", "identifier", "string");
        row.unit = "pcs".to_string();
        let violations = run(&IdentifierRule::new(), &[row], GateMode::Import);
        assert_eq!(ids(&violations), vec![RuleId::IdentifierUnitNotEmpty]);
    }

    #[test]
    fn test_resolution_failure_stops_row() {
        let rows = vec![feature("bad_name", "identifier", "ref:missing")];
        let violations = run(&IdentifierRule::new(), &rows, GateMode::Import);
        assert_eq!(ids(&violations), vec![RuleId::TypeRefNotFound]);
    }
}
