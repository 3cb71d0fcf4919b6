//! Publish-gate completeness
//!
//! A structured feature is only publishable once its children exist:
//! - `data_class = object` resolving to `json<object:S>` needs some `S.*` row
//! - `data_class = array` resolving to `json<array:object>` needs some
//!   `<code>.item.*` row
//!
//! Imports may arrive in pieces, so this rule is skipped in import mode.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use super::{Rule, RuleCategory, RuleContext, RuleId, Violation};
use crate::config::GateMode;
use crate::type_expr::object_schema;

const ARRAY_OF_OBJECT: &str = "json<array:object>";

/// Codes per tenant, sorted so prefix lookups are range scans
struct TenantCodes<'a> {
    codes: BTreeMap<&'a str, BTreeSet<&'a str>>,
}

impl<'a> TenantCodes<'a> {
    fn build(context: &RuleContext<'_, 'a>) -> Self {
        let mut codes: BTreeMap<&'a str, BTreeSet<&'a str>> = BTreeMap::new();
        for row in context.rows {
            codes
                .entry(row.tenant_id.as_str())
                .or_default()
                .insert(row.code.as_str());
        }
        Self { codes }
    }

    /// Whether a code other than `own` starts with `prefix`
    fn has_other_with_prefix(&self, tenant_id: &str, prefix: &str, own: &str) -> bool {
        let Some(codes) = self.codes.get(tenant_id) else {
            return false;
        };
        codes
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|code| code.starts_with(prefix))
            .any(|code| *code != own)
    }
}

/// Rule for object/array child completeness
pub struct CompletenessRule;

impl CompletenessRule {
    pub const ID: &'static str = "completeness";

    pub fn new() -> Self {
        Self
    }
}

impl Default for CompletenessRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for CompletenessRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Completeness"
    }

    fn description(&self) -> &str {
        "object features need S.* children and array<object> features need <code>.item.* children"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Completeness
    }

    fn is_applicable(&self, mode: GateMode) -> bool {
        mode == GateMode::Publish
    }

    fn evaluate(&self, context: &RuleContext<'_, '_>) -> Vec<Violation> {
        let tenant_codes = TenantCodes::build(context);
        let mut violations = Vec::new();

        for row in context.rows.iter().filter(|r| r.is_feature()) {
            let object_check = row.data_class == "object";
            let array_check = row.data_class == "array";
            if !object_check && !array_check {
                continue;
            }

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

            if object_check {
                if let Some(schema) = object_schema(&effective) {
                    let prefix = format!("{schema}.");
                    if !tenant_codes.has_other_with_prefix(&row.tenant_id, &prefix, &row.code) {
                        violations.push(
                            Violation::error(
                                RuleId::CompletenessObjectChildrenMissing,
                                format!("object schema_ref {schema} must have S.* child fields"),
                                row,
                            )
                            .at("value_type", row.value_type.clone()),
                        );
                    }
                }
            }

            if array_check && effective == ARRAY_OF_OBJECT {
                let prefix = format!("{}.item.", row.code);
                if !tenant_codes.has_other_with_prefix(&row.tenant_id, &prefix, &row.code) {
                    violations.push(
                        Violation::error(
                            RuleId::CompletenessArrayObjectItemsMissing,
                            "json<array:object> must have xxx.item.* child fields",
                            row,
                        )
                        .at("value_type", row.value_type.clone()),
                    );
                }
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{feature, ids, run};
    use super::*;

    #[test]
    fn test_only_applies_to_publish() {
        let rule = CompletenessRule::new();
        assert!(rule.is_applicable(GateMode::Publish));
        assert!(!rule.is_applicable(GateMode::Import));
    }

    #[test]
    fn test_object_children() {
        let object = feature("company.profile", "object", "json<object:s.base>");
        let violations = run(&CompletenessRule::new(), &[object.clone()], GateMode::Publish);
        assert_eq!(ids(&violations), vec![RuleId::CompletenessObjectChildrenMissing]);
        assert_eq!(
            violations[0].message,
            "object schema_ref s.base must have S.* child fields"
        );

        let rows = vec![object, feature("s.base.name", "text", "string")];
        assert!(run(&CompletenessRule::new(), &rows, GateMode::Publish).is_empty());
    }

    #[test]
    fn test_prefix_requires_dot_boundary() {
        let rows = vec![
            feature("company.profile", "object", "json<object:s.base>"),
            feature("s.baseline", "text", "string"),
        ];
        let violations = run(&CompletenessRule::new(), &rows, GateMode::Publish);
        assert_eq!(ids(&violations), vec![RuleId::CompletenessObjectChildrenMissing]);
    }

    #[test]
    fn test_own_code_is_not_a_child() {
        let rows = vec![feature("s.base.self", "object", "json<object:s.base>")];
        let violations = run(&CompletenessRule::new(), &rows, GateMode::Publish);
        assert_eq!(ids(&violations), vec![RuleId::CompletenessObjectChildrenMissing]);
    }

    #[test]
    fn test_children_must_share_tenant() {
        let mut child = feature("s.base.name", "text", "string");
        child.tenant_id = "t2".to_string();
        let rows = vec![feature("company.profile", "object", "json<object:s.base>"), child];
        let violations = run(&CompletenessRule::new(), &rows, GateMode::Publish);
        assert_eq!(ids(&violations), vec![RuleId::CompletenessObjectChildrenMissing]);
    }

    #[test]
    fn test_array_items() {
        let array = feature("company.contacts", "array", "json<array:object>");
        let violations = run(&CompletenessRule::new(), &[array.clone()], GateMode::Publish);
        assert_eq!(ids(&violations), vec![RuleId::CompletenessArrayObjectItemsMissing]);

        let rows = vec![array, feature("company.contacts.item.phone", "text", "string")];
        assert!(run(&CompletenessRule::new(), &rows, GateMode::Publish).is_empty());
    }

    #[test]
    fn test_array_of_scalars_needs_no_items() {
        let rows = vec![feature("company.tags", "array", "json<array:string>")];
        assert!(run(&CompletenessRule::new(), &rows, GateMode::Publish).is_empty());
    }

    #[test]
    fn test_resolved_through_ref() {
        let rows = vec![
            feature("shape.address", "object", "json<object:addr>"),
            feature("company.address", "object", "ref:shape.address"),
            feature("addr.city", "text", "string"),
        ];
        assert!(run(&CompletenessRule::new(), &rows, GateMode::Publish).is_empty());
    }

    #[test]
    fn test_attribute_rows_ignored() {
        let rows = vec![feature("company.blob", "attribute", "json<object:s.base>")];
        assert!(run(&CompletenessRule::new(), &rows, GateMode::Publish).is_empty());
    }
}
