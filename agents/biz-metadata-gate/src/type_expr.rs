//! Type expression grammar
//!
//! Purely syntactic classification of `value_type` strings. Nothing here
//! looks at other rows; `ref:` targets are followed by the
//! [`TypeResolver`](crate::resolver::TypeResolver).

use regex::Regex;
use std::sync::LazyLock;

/// Scalar value types
pub const SCALAR_TYPES: [&str; 6] = ["string", "int", "decimal", "boolean", "date", "datetime"];

/// Value types allowed for `data_class = identifier`
pub const IDENTIFIER_ALLOWED: [&str; 3] = ["string", "int", "int|string"];

const SEGMENT: &str = r"[a-z][a-z0-9_]*";

/// Dot-separated snake_case path, e.g. `company.base.name_cn`
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^{SEGMENT}(\.{SEGMENT})*$")).expect("code pattern is valid")
});

/// Single type atom (no dots)
static TYPE_ATOM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^{SEGMENT}$")).expect("atom pattern is valid"));

static OBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^json<object:({SEGMENT}(\.{SEGMENT})*)>$"))
        .expect("object pattern is valid")
});

static ARRAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^json<array:({SEGMENT}(\s*\|\s*{SEGMENT})+|{SEGMENT}|object)>$"
    ))
    .expect("array pattern is valid")
});

static TYPE_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^ref:({SEGMENT}(\.{SEGMENT})*)$")).expect("ref pattern is valid")
});

/// Identifier naming convention `*.id.<id_type>`
static IDENTIFIER_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^.+\.id\.{SEGMENT}$")).expect("identifier pattern is valid")
});

/// Syntactic shape of a valid type expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr<'a> {
    Scalar(&'a str),
    Union(Vec<&'a str>),
    Object { schema: &'a str },
    Array { element: &'a str },
    Ref { code: &'a str },
}

impl<'a> TypeExpr<'a> {
    /// Classify a type expression, `None` when it is not syntactically valid
    pub fn classify(expr: &'a str) -> Option<Self> {
        let expr = expr.trim();

        if let Some(terms) = split_union_terms(expr) {
            let canonical = terms.join("|");
            if IDENTIFIER_ALLOWED.contains(&canonical.as_str()) {
                return Some(TypeExpr::Union(terms));
            }
        } else if is_scalar(expr) {
            return Some(TypeExpr::Scalar(expr));
        }

        if let Some(schema) = object_schema(expr) {
            return Some(TypeExpr::Object { schema });
        }
        if let Some(element) = array_element(expr) {
            return Some(TypeExpr::Array { element });
        }
        if let Some(code) = type_ref_target(expr) {
            return Some(TypeExpr::Ref { code });
        }

        if expr.contains('|') {
            let terms = split_union_terms(expr)?;
            let all_valid = terms
                .iter()
                .all(|t| is_scalar(t) || is_type_atom(t) || type_ref_target(t).is_some());
            return all_valid.then_some(TypeExpr::Union(terms));
        }

        None
    }
}

/// Whether `expr` is a valid type expression
pub fn is_syntactically_valid(expr: &str) -> bool {
    TypeExpr::classify(expr).is_some()
}

/// Split `a | b | c` into trimmed terms; `None` without `|` or with an empty side
pub fn split_union_terms(expr: &str) -> Option<Vec<&str>> {
    if !expr.contains('|') {
        return None;
    }
    let terms: Vec<&str> = expr.split('|').map(str::trim).collect();
    if terms.iter().any(|t| t.is_empty()) {
        return None;
    }
    Some(terms)
}

/// Join union terms without surrounding whitespace; other expressions unchanged
pub fn canonical_union(expr: &str) -> String {
    match split_union_terms(expr) {
        Some(terms) => terms.join("|"),
        None => expr.to_string(),
    }
}

pub fn is_scalar(term: &str) -> bool {
    SCALAR_TYPES.contains(&term)
}

pub fn is_type_atom(term: &str) -> bool {
    TYPE_ATOM_RE.is_match(term)
}

/// Whether `code` is a dot-separated snake_case path
pub fn is_valid_code(code: &str) -> bool {
    CODE_RE.is_match(code)
}

/// Whether `code` follows the `*.id.<id_type>` convention
pub fn is_identifier_code(code: &str) -> bool {
    IDENTIFIER_CODE_RE.is_match(code)
}

/// Target code of a `ref:<code>` expression
pub fn type_ref_target(expr: &str) -> Option<&str> {
    TYPE_REF_RE
        .captures(expr)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Schema prefix `S` of `json<object:S>`
pub fn object_schema(expr: &str) -> Option<&str> {
    OBJECT_RE
        .captures(expr)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Element type `T` of `json<array:T>`
pub fn array_element(expr: &str) -> Option<&str> {
    ARRAY_RE
        .captures(expr)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}
