//! Columnar record filtering
//!
//! A filter specification maps a field name to a list of predicate strings.
//! Within one field the predicates are OR-combined; across fields they are
//! AND-combined. Predicates come in two flavors:
//!
//! - **Numeric**: an optional comparison prefix (`>`, `<`, `>=`/`≥`,
//!   `<=`/`≤`, `!=`/`≠`/`<>`) followed by a number; no prefix means
//!   equality. A predicate is numeric when the remainder after stripping
//!   the prefix parses as a float.
//! - **String**: a negation prefix (`!=`/`≠`/`<>`) means exact-mismatch;
//!   anything else is a glob where `*` matches any run of characters,
//!   anchored at both ends.
//!
//! A record missing a filtered field is excluded from the result with a
//! diagnostic, never an error. Filtering is pure and order-preserving.

use crate::types::{JsonValue, Record};
use regex::Regex;
use std::collections::HashMap;
use tracing::warn;

#[cfg(test)]
mod tests;

/// Filter specification: field name -> OR-combined predicate strings
pub type FilterSpec = HashMap<String, Vec<String>>;

// ============================================================================
// Predicates
// ============================================================================

/// Comparison operator for numeric predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumericOp {
    Gt,
    Lt,
    Ge,
    Le,
    Ne,
    Eq,
}

impl NumericOp {
    fn compare(self, value: f64, operand: f64) -> bool {
        match self {
            Self::Gt => value > operand,
            Self::Lt => value < operand,
            Self::Ge => value >= operand,
            Self::Le => value <= operand,
            Self::Ne => value != operand,
            Self::Eq => value == operand,
        }
    }
}

/// Operator prefixes, longest first so `>=` wins over `>`
const OPERATOR_PREFIXES: &[(&str, NumericOp)] = &[
    (">=", NumericOp::Ge),
    ("<=", NumericOp::Le),
    ("!=", NumericOp::Ne),
    ("<>", NumericOp::Ne),
    ("≥", NumericOp::Ge),
    ("≤", NumericOp::Le),
    ("≠", NumericOp::Ne),
    (">", NumericOp::Gt),
    ("<", NumericOp::Lt),
];

/// Split a predicate string into its operator prefix and operand
fn split_operator(raw: &str) -> (Option<NumericOp>, &str) {
    for (prefix, op) in OPERATOR_PREFIXES {
        if let Some(rest) = raw.strip_prefix(prefix) {
            return (Some(*op), rest);
        }
    }
    (None, raw)
}

/// One parsed predicate
#[derive(Debug, Clone)]
enum Predicate {
    /// Numeric comparison against the operand
    Numeric { op: NumericOp, operand: f64 },
    /// String must differ from the excluded value
    NotEqualText { excluded: String },
    /// Anchored glob match over the whole string
    Wildcard { pattern: Regex },
}

impl Predicate {
    fn parse(raw: &str) -> Self {
        let (op, operand) = split_operator(raw);

        if let Ok(number) = operand.trim().parse::<f64>() {
            return Self::Numeric {
                op: op.unwrap_or(NumericOp::Eq),
                operand: number,
            };
        }

        if op == Some(NumericOp::Ne) {
            return Self::NotEqualText {
                excluded: operand.to_string(),
            };
        }

        // Non-negated string predicates are globs over the raw text. The
        // escaped pattern is always a valid regex.
        let pattern = format!("^{}$", regex::escape(raw).replace("\\*", ".*"));
        Self::Wildcard {
            pattern: Regex::new(&pattern).expect("escaped glob pattern compiles"),
        }
    }

    fn matches(&self, value: &JsonValue) -> bool {
        match self {
            Self::Numeric { op, operand } => match numeric_value(value) {
                Some(number) => op.compare(number, *operand),
                // A non-numeric value is never equal to the operand
                None => *op == NumericOp::Ne,
            },
            Self::NotEqualText { excluded } => {
                value.as_str().map_or(true, |s| s != excluded.as_str())
            }
            Self::Wildcard { pattern } => value.as_str().is_some_and(|s| pattern.is_match(s)),
        }
    }
}

/// Coerce a JSON value to a float, accepting numeric strings
fn numeric_value(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ============================================================================
// Filter application
// ============================================================================

struct CompiledFilter {
    field: String,
    predicates: Vec<Predicate>,
}

fn compile(filters: &FilterSpec) -> Vec<CompiledFilter> {
    filters
        .iter()
        .map(|(field, values)| CompiledFilter {
            field: field.clone(),
            predicates: values.iter().map(|v| Predicate::parse(v)).collect(),
        })
        .collect()
}

fn record_matches(record: &Record, filters: &[CompiledFilter]) -> bool {
    for filter in filters {
        let Some(value) = record.get(&filter.field) else {
            warn!(
                field = %filter.field,
                "record lacks filtered field, excluding it from results"
            );
            return false;
        };

        if !filter.predicates.iter().any(|p| p.matches(value)) {
            return false;
        }
    }
    true
}

/// Apply a filter specification to a sequence of records.
///
/// Order-preserving and pure; an empty specification returns the input
/// unchanged.
pub fn apply_filters(records: Vec<Record>, filters: &FilterSpec) -> Vec<Record> {
    if filters.is_empty() {
        return records;
    }

    let compiled = compile(filters);
    records
        .into_iter()
        .filter(|record| record_matches(record, &compiled))
        .collect()
}
