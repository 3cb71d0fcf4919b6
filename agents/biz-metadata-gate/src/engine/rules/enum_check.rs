//! Enum value rules
//!
//! Enumerated columns, when filled, must hold one of their allowed values.
//! Emptiness is left to the required and scope rules.

use super::{Rule, RuleCategory, RuleContext, RuleId, Violation};
use crate::row::{DATA_CLASSES, OBJECT_TYPES, SOURCES, STATUSES};

/// An enumerated column and its allowed values
struct EnumColumn {
    column: &'static str,
    allowed: &'static [&'static str],
    rule_id: RuleId,
}

const ENUM_COLUMNS: [EnumColumn; 4] = [
    EnumColumn {
        column: "object_type",
        allowed: &OBJECT_TYPES,
        rule_id: RuleId::EnumObjectType,
    },
    EnumColumn {
        column: "status",
        allowed: &STATUSES,
        rule_id: RuleId::EnumStatus,
    },
    EnumColumn {
        column: "source",
        allowed: &SOURCES,
        rule_id: RuleId::EnumSource,
    },
    EnumColumn {
        column: "data_class",
        allowed: &DATA_CLASSES,
        rule_id: RuleId::EnumDataClass,
    },
];

/// Rule for validating enumerated columns
pub struct EnumRule;

impl EnumRule {
    pub const ID: &'static str = "enum-values";

    pub fn new() -> Self {
        Self
    }
}

impl Default for EnumRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for EnumRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Enum values"
    }

    fn description(&self) -> &str {
        "object_type, status, source and data_class must use their allowed values"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Enum
    }

    fn evaluate(&self, context: &RuleContext<'_, '_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for row in context.rows {
            for column in &ENUM_COLUMNS {
                let value = row.field(column.column).unwrap_or_default();
                if !value.is_empty() && !column.allowed.contains(&value.as_str()) {
                    violations.push(
                        Violation::error(
                            column.rule_id,
                            format!("invalid {}: {}", column.column, value),
                            row,
                        )
                        .at(column.column, value),
                    );
                }
            }
        }

        violations
    }
}
