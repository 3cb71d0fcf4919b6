//! Normalized row model
//!
//! A [`Row`] is the trimmed, blank-normalized view of one raw record.
//! Construction never fails: malformed values flow through as empty strings
//! (or `0` for `version`) and are reported by the rules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw string-keyed record as produced by the CSV/Markdown loaders
pub type RawRecord = BTreeMap<String, String>;

/// Columns read from every record
pub const COLUMNS: [&str; 12] = [
    "tenant_id",
    "version",
    "code",
    "name",
    "description",
    "object_type",
    "parent_code",
    "data_class",
    "value_type",
    "unit",
    "status",
    "source",
];

/// Columns accepted but ignored by the gate
pub const OPTIONAL_COLUMNS: [&str; 5] = ["id", "parent_id", "created_at", "updated_at", "deleted_at"];

/// Allowed `object_type` values
pub const OBJECT_TYPES: [&str; 5] = ["entity", "event", "relation", "document", "feature"];

/// Allowed `data_class` values (feature rows only)
pub const DATA_CLASSES: [&str; 6] = ["attribute", "metric", "text", "object", "array", "identifier"];

/// Allowed `status` values
pub const STATUSES: [&str; 2] = ["active", "deprecated"];

/// Allowed `source` values
pub const SOURCES: [&str; 3] = ["manual", "auto_mine", "api_sync"];

pub const FEATURE: &str = "feature";
pub const ACTIVE: &str = "active";

/// Textual markers treated as "not filled in"
const BLANK_MARKERS: [&str; 3] = ["null", "none", "nan"];

/// Normalize a raw cell: trim, and map blank markers to the empty string
pub fn normalize(value: Option<&str>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    let trimmed = value.trim();
    if BLANK_MARKERS.contains(&trimmed.to_lowercase().as_str()) {
        String::new()
    } else {
        trimmed.to_string()
    }
}

/// One metadata record
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Row {
    pub tenant_id: String,
    /// `0` when missing or non-numeric
    pub version: i64,
    pub code: String,
    pub name: String,
    pub description: String,
    pub object_type: String,
    pub parent_code: String,
    pub data_class: String,
    pub value_type: String,
    pub unit: String,
    pub status: String,
    pub source: String,
}

impl Row {
    /// Build a row from a raw record
    pub fn from_raw(raw: &RawRecord) -> Self {
        let field = |key: &str| normalize(raw.get(key).map(String::as_str));

        let version = field("version");
        let version = if version.is_empty() {
            0
        } else {
            version.parse::<i64>().unwrap_or(0)
        };

        Self {
            tenant_id: field("tenant_id"),
            version,
            code: field("code"),
            name: field("name"),
            description: field("description"),
            object_type: field("object_type"),
            parent_code: field("parent_code"),
            data_class: field("data_class"),
            value_type: field("value_type"),
            unit: field("unit"),
            status: field("status"),
            source: field("source"),
        }
    }

    /// Build a row from `(column, value)` pairs
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let raw: RawRecord = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self::from_raw(&raw)
    }

    /// Value of a string column by name (`version` is rendered as text)
    pub fn field(&self, column: &str) -> Option<String> {
        let value = match column {
            "tenant_id" => &self.tenant_id,
            "version" => return Some(self.version.to_string()),
            "code" => &self.code,
            "name" => &self.name,
            "description" => &self.description,
            "object_type" => &self.object_type,
            "parent_code" => &self.parent_code,
            "data_class" => &self.data_class,
            "value_type" => &self.value_type,
            "unit" => &self.unit,
            "status" => &self.status,
            "source" => &self.source,
            _ => return None,
        };
        Some(value.clone())
    }

    pub fn is_feature(&self) -> bool {
        self.object_type == FEATURE
    }

    pub fn is_active(&self) -> bool {
        self.status == ACTIVE
    }
}
