//! Rule framework for the metadata gate
//!
//! Every rule reads the whole batch through a [`RuleContext`] and returns
//! [`Violation`]s. Rules never mutate rows and never fail on bad data.

pub mod code_format;
pub mod completeness;
pub mod enum_check;
pub mod hierarchy;
pub mod identifier;
pub mod required;
pub mod scope;
pub mod type_check;
pub mod uniqueness;
pub mod unit;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::GateMode;
use crate::resolver::{ResolveError, RowIndex, TypeResolver};
use crate::row::Row;

/// Categories of gate rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    /// Mandatory fields and version
    Required,
    /// Enumerated columns
    Enum,
    /// Code naming
    Format,
    /// `(tenant_id, code)` uniqueness
    Uniqueness,
    /// Which object types may carry type fields
    Scope,
    /// `value_type` syntax and TypeRef resolution
    Type,
    /// Unit usage
    Unit,
    /// Identifier features
    Identifier,
    /// `parent_code` consistency
    Hierarchy,
    /// Object/array children (publish gate)
    Completeness,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleCategory::Required => write!(f, "required"),
            RuleCategory::Enum => write!(f, "enum"),
            RuleCategory::Format => write!(f, "format"),
            RuleCategory::Uniqueness => write!(f, "uniqueness"),
            RuleCategory::Scope => write!(f, "scope"),
            RuleCategory::Type => write!(f, "type"),
            RuleCategory::Unit => write!(f, "unit"),
            RuleCategory::Identifier => write!(f, "identifier"),
            RuleCategory::Hierarchy => write!(f, "hierarchy"),
            RuleCategory::Completeness => write!(f, "completeness"),
        }
    }
}

/// Severity level for violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Should be addressed; fails the gate only with fail-on-warn
    #[serde(rename = "WARN")]
    Warn,
    /// Blocks ingestion/publishing
    #[serde(rename = "ERROR")]
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable rule identifiers, relied on by downstream aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleId {
    BasicRequiredMissing,
    BasicVersionInvalid,
    EnumObjectType,
    EnumStatus,
    EnumSource,
    EnumDataClass,
    CodeFormat,
    UniqueTenantCode,
    ScopeNonFeatureHasType,
    ScopeFeatureMissingType,
    TypeSyntaxInvalid,
    TypeRefNotFound,
    TypeRefTargetNotFeature,
    TypeRefTargetNotActive,
    TypeRefTargetNoType,
    TypeRefCycle,
    TypeRefTooDeep,
    TypeRefResolvedInvalid,
    UnitNotAllowed,
    IdentifierValueType,
    IdentifierUnitNotEmpty,
    IdentifierCodePattern,
    HierarchyParentMissing,
    HierarchyParentPrefix,
    CompletenessObjectChildrenMissing,
    CompletenessArrayObjectItemsMissing,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::BasicRequiredMissing => "BASIC_REQUIRED_MISSING",
            RuleId::BasicVersionInvalid => "BASIC_VERSION_INVALID",
            RuleId::EnumObjectType => "ENUM_OBJECT_TYPE",
            RuleId::EnumStatus => "ENUM_STATUS",
            RuleId::EnumSource => "ENUM_SOURCE",
            RuleId::EnumDataClass => "ENUM_DATA_CLASS",
            RuleId::CodeFormat => "CODE_FORMAT",
            RuleId::UniqueTenantCode => "UNIQUE_TENANT_CODE",
            RuleId::ScopeNonFeatureHasType => "SCOPE_NON_FEATURE_HAS_TYPE",
            RuleId::ScopeFeatureMissingType => "SCOPE_FEATURE_MISSING_TYPE",
            RuleId::TypeSyntaxInvalid => "TYPE_SYNTAX_INVALID",
            RuleId::TypeRefNotFound => "TYPE_REF_NOT_FOUND",
            RuleId::TypeRefTargetNotFeature => "TYPE_REF_TARGET_NOT_FEATURE",
            RuleId::TypeRefTargetNotActive => "TYPE_REF_TARGET_NOT_ACTIVE",
            RuleId::TypeRefTargetNoType => "TYPE_REF_TARGET_NO_TYPE",
            RuleId::TypeRefCycle => "TYPE_REF_CYCLE",
            RuleId::TypeRefTooDeep => "TYPE_REF_TOO_DEEP",
            RuleId::TypeRefResolvedInvalid => "TYPE_REF_RESOLVED_INVALID",
            RuleId::UnitNotAllowed => "UNIT_NOT_ALLOWED",
            RuleId::IdentifierValueType => "IDENTIFIER_VALUE_TYPE",
            RuleId::IdentifierUnitNotEmpty => "IDENTIFIER_UNIT_NOT_EMPTY",
            RuleId::IdentifierCodePattern => "IDENTIFIER_CODE_PATTERN",
            RuleId::HierarchyParentMissing => "HIERARCHY_PARENT_MISSING",
            RuleId::HierarchyParentPrefix => "HIERARCHY_PARENT_PREFIX",
            RuleId::CompletenessObjectChildrenMissing => "COMPLETENESS_OBJECT_CHILDREN_MISSING",
            RuleId::CompletenessArrayObjectItemsMissing => {
                "COMPLETENESS_ARRAY_OBJECT_ITEMS_MISSING"
            }
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single gate violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub severity: Severity,
    pub rule_id: RuleId,
    /// Human-readable explanation
    pub message: String,
    pub tenant_id: String,
    pub code: String,
    /// Offending column(s), e.g. `value_type` or `data_class/value_type`
    pub field: String,
    /// Offending value as seen by the rule
    pub value: String,
}

impl Violation {
    /// Create a violation located at a row
    pub fn new(severity: Severity, rule_id: RuleId, message: impl Into<String>, row: &Row) -> Self {
        Self {
            severity,
            rule_id,
            message: message.into(),
            tenant_id: row.tenant_id.clone(),
            code: row.code.clone(),
            field: String::new(),
            value: String::new(),
        }
    }

    /// Create an ERROR violation
    pub fn error(rule_id: RuleId, message: impl Into<String>, row: &Row) -> Self {
        Self::new(Severity::Error, rule_id, message, row)
    }

    /// Create a WARN violation
    pub fn warn(rule_id: RuleId, message: impl Into<String>, row: &Row) -> Self {
        Self::new(Severity::Warn, rule_id, message, row)
    }

    /// Surface a resolver failure on the row that declared the reference
    pub fn from_resolve_error(err: &ResolveError, row: &Row) -> Self {
        Self::error(err.rule_id(), err.to_string(), row).at("value_type", err.value.clone())
    }

    /// Set the offending field and value
    pub fn at(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.field = field.into();
        self.value = value.into();
        self
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} at '{}/{}' {}: {}",
            self.severity, self.rule_id, self.tenant_id, self.code, self.field, self.message
        )
    }
}

/// Everything a rule can read during one evaluation
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'c, 'a> {
    /// The batch, in input order
    pub rows: &'a [Row],
    pub index: &'c RowIndex<'a>,
    pub resolver: TypeResolver<'c, 'a>,
    pub mode: GateMode,
}

impl<'c, 'a> RuleContext<'c, 'a> {
    pub fn new(rows: &'a [Row], index: &'c RowIndex<'a>, max_ref_depth: usize, mode: GateMode) -> Self {
        Self {
            rows,
            index,
            resolver: TypeResolver::new(index, max_ref_depth),
            mode,
        }
    }
}

/// Trait for gate rules
///
/// Rules are deterministic: rows are visited in input order and the same
/// batch always yields the same violations.
pub trait Rule: Send + Sync {
    /// Unique identifier for this rule
    fn id(&self) -> &str;

    /// Human-readable name for this rule
    fn name(&self) -> &str;

    /// Description of what this rule validates
    fn description(&self) -> &str;

    /// Category this rule belongs to
    fn category(&self) -> RuleCategory;

    /// Whether this rule runs in the given gate mode
    fn is_applicable(&self, _mode: GateMode) -> bool {
        true
    }

    /// Evaluate the rule over the whole batch
    fn evaluate(&self, context: &RuleContext<'_, '_>) -> Vec<Violation>;
}

/// A boxed rule for dynamic dispatch
pub type BoxedRule = Box<dyn Rule>;
