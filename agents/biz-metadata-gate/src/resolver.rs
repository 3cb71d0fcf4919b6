//! TypeRef resolution
//!
//! `value_type = ref:<code>` points at another feature row's declared type.
//! [`TypeResolver`] follows such chains within a tenant and returns the final,
//! non-reference expression. The walk is iterative with an explicit chain and
//! step counter, so cycles and excessive depth are detected the same way.
//!
//! Unions may mix references with plain terms (`ref:a | ref:b | string`).
//! Each reference is resolved independently, then the terms are flattened and
//! deduplicated in first-seen order, so `ref:x | ref:y` with both targets
//! declared as `string` resolves to `string`.

use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::trace;

use crate::engine::rules::RuleId;
use crate::row::Row;
use crate::type_expr::{canonical_union, split_union_terms, type_ref_target};

/// Immutable `(tenant_id, code) -> Row` lookup built once per evaluation
///
/// Rows with an empty tenant or code are not indexed. When a key repeats,
/// the later row wins; the duplicate itself is reported by the uniqueness rule.
#[derive(Debug, Default)]
pub struct RowIndex<'a> {
    rows: HashMap<(&'a str, &'a str), &'a Row>,
}

impl<'a> RowIndex<'a> {
    pub fn build(rows: &'a [Row]) -> Self {
        let rows = rows
            .iter()
            .filter(|r| !r.tenant_id.is_empty() && !r.code.is_empty())
            .map(|r| ((r.tenant_id.as_str(), r.code.as_str()), r))
            .collect();
        Self { rows }
    }

    pub fn get(&self, tenant_id: &str, code: &str) -> Option<&'a Row> {
        self.rows.get(&(tenant_id, code)).copied()
    }

    pub fn contains(&self, tenant_id: &str, code: &str) -> bool {
        self.rows.contains_key(&(tenant_id, code))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Successful resolution of a `value_type`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    /// The expression as declared on the row
    pub raw: String,
    /// Final expression with every reference substituted
    pub resolved: String,
    /// Code of the row whose type was adopted (single references only)
    pub canonical_code: Option<String>,
    /// Codes visited while following references
    pub chain: Vec<String>,
}

impl ResolvedType {
    fn identity(expr: &str) -> Self {
        Self {
            raw: expr.to_string(),
            resolved: canonical_union(expr),
            canonical_code: None,
            chain: Vec::new(),
        }
    }
}

/// Why a reference could not be followed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveFailure {
    #[error("type_ref target not found: {code}")]
    NotFound { code: String },

    #[error("type_ref target must be object_type=feature: {code} ({object_type})")]
    TargetNotFeature { code: String, object_type: String },

    #[error("type_ref target must be status=active: {code} ({status})")]
    TargetNotActive { code: String, status: String },

    #[error("type_ref target has empty value_type: {code}")]
    TargetNoType { code: String },

    #[error("type_ref cycle detected: {}", chain.join(" -> "))]
    Cycle { chain: Vec<String> },

    #[error("type_ref depth exceeded (>{max_depth}): {}", chain.join(" -> "))]
    TooDeep { max_depth: usize, chain: Vec<String> },
}

impl ResolveFailure {
    pub fn rule_id(&self) -> RuleId {
        match self {
            ResolveFailure::NotFound { .. } => RuleId::TypeRefNotFound,
            ResolveFailure::TargetNotFeature { .. } => RuleId::TypeRefTargetNotFeature,
            ResolveFailure::TargetNotActive { .. } => RuleId::TypeRefTargetNotActive,
            ResolveFailure::TargetNoType { .. } => RuleId::TypeRefTargetNoType,
            ResolveFailure::Cycle { .. } => RuleId::TypeRefCycle,
            ResolveFailure::TooDeep { .. } => RuleId::TypeRefTooDeep,
        }
    }
}

/// A resolution failure tagged with the offending expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{failure}")]
pub struct ResolveError {
    pub failure: ResolveFailure,
    /// The unresolved expression (the whole union when a term failed)
    pub value: String,
}

impl ResolveError {
    pub fn rule_id(&self) -> RuleId {
        self.failure.rule_id()
    }
}

/// Follows `ref:` chains over a [`RowIndex`]
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'i, 'a> {
    index: &'i RowIndex<'a>,
    max_depth: usize,
}

impl<'i, 'a> TypeResolver<'i, 'a> {
    pub fn new(index: &'i RowIndex<'a>, max_depth: usize) -> Self {
        Self { index, max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Resolve a `value_type` within a tenant
    ///
    /// `Ok(None)` means the expression is empty and there is nothing to
    /// resolve; required-field rules own that case.
    pub fn resolve(
        &self,
        tenant_id: &str,
        value_type: &str,
    ) -> Result<Option<ResolvedType>, ResolveError> {
        let expr = value_type.trim();
        if expr.is_empty() {
            return Ok(None);
        }

        if type_ref_target(expr).is_some() {
            return self.resolve_single_ref(tenant_id, expr).map(Some);
        }

        let Some(terms) = split_union_terms(expr) else {
            return Ok(Some(ResolvedType::identity(expr)));
        };

        let mut resolved_terms = Vec::with_capacity(terms.len());
        let mut chain = Vec::new();
        for term in terms {
            if type_ref_target(term).is_some() {
                let resolved = self
                    .resolve_single_ref(tenant_id, term)
                    .map_err(|e| ResolveError {
                        failure: e.failure,
                        value: expr.to_string(),
                    })?;
                resolved_terms.push(resolved.resolved);
                chain.extend(resolved.chain);
            } else {
                resolved_terms.push(term.to_string());
            }
        }

        Ok(Some(ResolvedType {
            raw: expr.to_string(),
            resolved: flatten_and_dedup(&resolved_terms),
            canonical_code: None,
            chain,
        }))
    }

    fn resolve_single_ref(&self, tenant_id: &str, expr: &str) -> Result<ResolvedType, ResolveError> {
        let fail = |failure| ResolveError {
            failure,
            value: expr.to_string(),
        };

        let Some(start) = type_ref_target(expr) else {
            return Ok(ResolvedType::identity(expr));
        };

        let mut chain: Vec<String> = Vec::new();
        let mut current = start.to_string();
        let mut depth = 0usize;

        loop {
            depth += 1;
            if depth > self.max_depth {
                let mut chain = chain;
                chain.push(current);
                return Err(fail(ResolveFailure::TooDeep {
                    max_depth: self.max_depth,
                    chain,
                }));
            }
            if chain.contains(&current) {
                let mut chain = chain;
                chain.push(current);
                return Err(fail(ResolveFailure::Cycle { chain }));
            }
            chain.push(current.clone());
            trace!(tenant_id, code = %current, depth, "following type_ref");

            let Some(row) = self.index.get(tenant_id, &current) else {
                return Err(fail(ResolveFailure::NotFound { code: current }));
            };
            if !row.is_feature() {
                return Err(fail(ResolveFailure::TargetNotFeature {
                    code: current,
                    object_type: row.object_type.clone(),
                }));
            }
            if !row.is_active() {
                return Err(fail(ResolveFailure::TargetNotActive {
                    code: current,
                    status: row.status.clone(),
                }));
            }

            let inner = row.value_type.trim();
            if inner.is_empty() {
                return Err(fail(ResolveFailure::TargetNoType { code: current }));
            }

            match type_ref_target(inner) {
                Some(next) => current = next.to_string(),
                None => {
                    return Ok(ResolvedType {
                        raw: expr.to_string(),
                        resolved: inner.to_string(),
                        canonical_code: Some(row.code.clone()),
                        chain,
                    })
                }
            }
        }
    }
}

/// Expand nested unions and drop repeated terms, keeping first-seen order
fn flatten_and_dedup(terms: &[String]) -> String {
    let mut seen = HashSet::new();
    let mut out: Vec<&str> = Vec::new();

    for term in terms {
        let parts = split_union_terms(term).unwrap_or_else(|| vec![term.as_str()]);
        for part in parts {
            let part = part.trim();
            if !part.is_empty() && seen.insert(part) {
                out.push(part);
            }
        }
    }

    out.join("|")
}
