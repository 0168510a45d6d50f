// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Filter expression parsing and translation.
//!
//! Source filters are prefix-notation arrays (`["all", ["==", "class", "park"], ...]`).
//! Target filters are objects keyed by feature property (`{ all: [{ class: park }] }`).

use serde_json::{json, Map, Value};

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};

/// Comparison operator of a leaf filter node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `in`
    In,
    /// `!in`
    NotIn,
    /// `has`
    Has,
    /// `!has`
    NotHas,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    fn parse(op: &str) -> Option<Self> {
        Some(match op {
            "==" => Self::Eq,
            "!=" => Self::Ne,
            "in" => Self::In,
            "!in" => Self::NotIn,
            "has" => Self::Has,
            "!has" => Self::NotHas,
            "<" => Self::Lt,
            "<=" => Self::Le,
            ">" => Self::Gt,
            ">=" => Self::Ge,
            _ => return None,
        })
    }
}

/// Boolean combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// At least one child matches.
    Any,
    /// Every child matches.
    All,
    /// No child matches.
    None,
}

impl Combinator {
    fn parse(op: &str) -> Option<Self> {
        match op {
            "any" => Some(Self::Any),
            "all" => Some(Self::All),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    const fn key(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::All => "all",
            Self::None => "none",
        }
    }
}

/// Parsed source filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// Leaf comparison on one feature key.
    Compare {
        /// Operator.
        op: CompareOp,
        /// Feature property, or `$type` for geometry.
        key: String,
        /// Operand(s) after the key.
        values: Vec<Value>,
    },
    /// Boolean combination.
    Combine {
        /// Combinator.
        op: Combinator,
        /// Child expressions in order.
        children: Vec<FilterExpr>,
    },
    /// Anything the grammar does not cover; carries a printable operator.
    Unrecognized(String),
}

impl FilterExpr {
    /// Parse a raw filter value. Never fails; unknown shapes become [`FilterExpr::Unrecognized`].
    pub fn parse(raw: &Value) -> Self {
        let Some(items) = raw.as_array() else {
            return Self::Unrecognized(raw.to_string());
        };
        let Some(op) = items.first().and_then(Value::as_str) else {
            return Self::Unrecognized(items.first().map_or_else(String::new, Value::to_string));
        };
        if let Some(op) = Combinator::parse(op) {
            return Self::Combine {
                op,
                children: items[1..].iter().map(Self::parse).collect(),
            };
        }
        match (CompareOp::parse(op), items.get(1).and_then(Value::as_str)) {
            (Some(cmp), Some(key)) => Self::Compare {
                op: cmp,
                key: key.to_owned(),
                values: items[2..].iter().map(literal).collect(),
            },
            _ => Self::Unrecognized(op.to_owned()),
        }
    }
}

/// `"true"` / `"false"` operands are booleans in the target schema.
fn literal(value: &Value) -> Value {
    match value.as_str() {
        Some("true") => Value::Bool(true),
        Some("false") => Value::Bool(false),
        _ => value.clone(),
    }
}

/// Source geometry name → target geometry name; unknown names pass through.
fn geometry(value: &Value) -> Value {
    match value.as_str() {
        Some("Polygon") => json!("polygon"),
        Some("LineString") => json!("line"),
        Some("Point") => json!("point"),
        _ => value.clone(),
    }
}

/// Translate a parsed filter into the target predicate form.
///
/// Unrecognized operators are reported to `sink` against `layer` and become `{}`.
pub fn translate_filter<S>(expr: &FilterExpr, layer: &str, sink: &mut S) -> Value
where
    S: DiagnosticSink + ?Sized,
{
    let mut node = Map::new();
    match expr {
        FilterExpr::Combine { op, children } => {
            let children = children.iter().map(|c| translate_filter(c, layer, sink)).collect();
            node.insert(op.key().to_owned(), Value::Array(children));
        }
        FilterExpr::Compare { op, key, values } => {
            let (key, values) = if key == "$type" {
                ("$geometry".to_owned(), values.iter().map(geometry).collect())
            } else {
                (key.clone(), values.clone())
            };
            let first = values.first().cloned().unwrap_or(Value::Null);
            match op {
                CompareOp::Eq => {
                    node.insert(key, first);
                }
                CompareOp::Ne => {
                    node.insert("not".to_owned(), json!({ key: first }));
                }
                CompareOp::In => {
                    node.insert(key, Value::Array(values));
                }
                CompareOp::NotIn => {
                    node.insert("not".to_owned(), json!({ key: values }));
                }
                CompareOp::Has => {
                    node.insert(key, Value::Bool(true));
                }
                CompareOp::NotHas => {
                    node.insert(key, Value::Bool(false));
                }
                // Strict and non-strict bounds collapse to the same range form.
                CompareOp::Lt | CompareOp::Le => {
                    node.insert(key, json!({ "max": first }));
                }
                CompareOp::Gt | CompareOp::Ge => {
                    node.insert(key, json!({ "min": first }));
                }
            }
        }
        FilterExpr::Unrecognized(op) => sink.report(Diagnostic::new(
            layer,
            DiagnosticKind::UnknownFilterOperator,
            format!("Unrecognised filter operator: {op}"),
        )),
    }
    Value::Object(node)
}

/// Translate a raw filter value in one step.
pub fn translate_raw<S>(raw: &Value, layer: &str, sink: &mut S) -> Value
where
    S: DiagnosticSink + ?Sized,
{
    translate_filter(&FilterExpr::parse(raw), layer, sink)
}

/// Prepend a `$zoom` range to `filter`.
///
/// An existing top-level `all` gains the range as its first child; any other
/// filter is wrapped as `{ all: [range, filter] }`; no filter yields `{ all: [range] }`.
pub fn with_zoom_range(filter: Option<Value>, min: Option<f64>, max: Option<f64>) -> Value {
    let mut range = Map::new();
    if let Some(min) = min {
        range.insert("min".to_owned(), crate::number::number_value(min));
    }
    if let Some(max) = max {
        range.insert("max".to_owned(), crate::number::number_value(max));
    }
    let zoom = json!({ "$zoom": range });
    match filter {
        Some(Value::Object(mut node)) if node.get("all").is_some_and(Value::is_array) => {
            if let Some(Value::Array(children)) = node.get_mut("all") {
                children.insert(0, zoom);
            }
            Value::Object(node)
        }
        Some(other) => json!({ "all": [zoom, other] }),
        None => json!({ "all": [zoom] }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tr(raw: Value) -> (Value, Vec<Diagnostic>) {
        let mut diags = Vec::new();
        let out = translate_raw(&raw, "l", &mut diags);
        (out, diags)
    }

    #[test]
    fn equality_and_negation() {
        assert_eq!(tr(json!(["==", "key", "v"])).0, json!({ "key": "v" }));
        assert_eq!(tr(json!(["!=", "key", "v"])).0, json!({ "not": { "key": "v" } }));
    }

    #[test]
    fn membership_and_presence() {
        assert_eq!(tr(json!(["in", "class", "a", "b"])).0, json!({ "class": ["a", "b"] }));
        assert_eq!(tr(json!(["!in", "class", "a"])).0, json!({ "not": { "class": ["a"] } }));
        assert_eq!(tr(json!(["has", "name"])).0, json!({ "name": true }));
        assert_eq!(tr(json!(["!has", "name"])).0, json!({ "name": false }));
    }

    #[test]
    fn ranges_collapse_strictness() {
        assert_eq!(tr(json!(["<", "rank", 5])).0, json!({ "rank": { "max": 5 } }));
        assert_eq!(tr(json!(["<=", "rank", 5])).0, json!({ "rank": { "max": 5 } }));
        assert_eq!(tr(json!([">=", "rank", 2])).0, json!({ "rank": { "min": 2 } }));
    }

    #[test]
    fn combinators_recurse() {
        let raw = json!(["all", ["==", "a", 1], ["any", ["has", "b"], ["!=", "c", "x"]]]);
        assert_eq!(
            tr(raw).0,
            json!({ "all": [{ "a": 1 }, { "any": [{ "b": true }, { "not": { "c": "x" } }] }] })
        );
        assert_eq!(tr(json!(["none", ["==", "a", 1]])).0, json!({ "none": [{ "a": 1 }] }));
    }

    #[test]
    fn geometry_type_is_rewritten() {
        assert_eq!(tr(json!(["==", "$type", "LineString"])).0, json!({ "$geometry": "line" }));
        assert_eq!(
            tr(json!(["in", "$type", "Point", "Polygon"])).0,
            json!({ "$geometry": ["point", "polygon"] })
        );
        assert_eq!(tr(json!(["==", "$type", "Blob"])).0, json!({ "$geometry": "Blob" }));
    }

    #[test]
    fn boolean_strings_become_booleans() {
        assert_eq!(tr(json!(["==", "oneway", "true"])).0, json!({ "oneway": true }));
        assert_eq!(tr(json!(["==", "oneway", "false"])).0, json!({ "oneway": false }));
    }

    #[test]
    fn unknown_operator_reports_and_yields_empty() {
        let (out, diags) = tr(json!(["match", ["get", "x"], "a", true, false]));
        assert_eq!(out, json!({}));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::UnknownFilterOperator);
        assert!(diags[0].message.contains("match"));
    }

    #[test]
    fn zoom_range_folding() {
        assert_eq!(
            with_zoom_range(None, Some(10.0), None),
            json!({ "all": [{ "$zoom": { "min": 10 } }] })
        );
        assert_eq!(
            with_zoom_range(Some(json!({ "all": [{ "a": 1 }] })), None, Some(14.0)),
            json!({ "all": [{ "$zoom": { "max": 14 } }, { "a": 1 }] })
        );
        assert_eq!(
            with_zoom_range(Some(json!({ "a": 1 })), Some(3.0), Some(9.5)),
            json!({ "all": [{ "$zoom": { "min": 3, "max": 9.5 } }, { "a": 1 }] })
        );
    }
}
