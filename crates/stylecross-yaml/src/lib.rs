// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Block/flow hybrid YAML emitter.
//!
//! Renders an ordered JSON tree as YAML: block style (indented, one entry per
//! line) near the root, flow style (`[a, b]`, `{ k: v }`) from `flow_level`
//! down, and flow style at any depth for keys listed in `always_flow`. Sibling
//! blocks near the root are separated by extra blank lines.
//!
//! The emitter does not know anything about the scene schema.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Emitter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitOptions {
    /// Depth at which maps and lists switch to flow style.
    pub flow_level: usize,
    /// Keys whose values are always written in flow style.
    pub always_flow: Vec<String>,
    /// Extra blank lines between top-level blocks; one fewer per level down.
    pub extra_lines: usize,
    /// One level of indentation.
    pub indent: String,
    /// Quote used for strings that are not bare identifiers.
    pub quote: char,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            flow_level: 100,
            always_flow: Vec::new(),
            extra_lines: 0,
            indent: "  ".to_owned(),
            quote: '"',
        }
    }
}

impl EmitOptions {
    /// Layout used for scene files: flow from depth 8, short numeric/list
    /// properties always inline, two blank lines between top-level sections.
    pub fn scene_preset() -> Self {
        Self {
            flow_level: 8,
            always_flow: [
                "size", "width", "dash", "buffer", "offset", "placement", "alpha", "data",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
            extra_lines: 2,
            ..Self::default()
        }
    }
}

/// Render `value` as YAML text (no trailing newline).
pub fn to_string(value: &Value, options: &EmitOptions) -> String {
    Emitter { options }.value(value, 0)
}

struct Emitter<'a> {
    options: &'a EmitOptions,
}

/// Letters, digits, `_` and `$` may start a bare token; `-` and `.` may follow.
fn is_bare(s: &str) -> bool {
    let mut chars = s.chars();
    let head = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$';
    match chars.next() {
        Some(c) if head(c) => chars.all(|c| head(c) || c == '-' || c == '.'),
        _ => false,
    }
}

/// Bare tokens a YAML reader would load as something other than a string.
fn is_reserved(s: &str) -> bool {
    matches!(s, "true" | "false" | "null" | "True" | "False" | "Null" | "TRUE" | "FALSE" | "NULL")
        || s.parse::<f64>().is_ok()
        || is_radix_int(s)
}

/// `0x1F`, `0o17`: YAML 1.2 core-schema hex and octal integers.
fn is_radix_int(s: &str) -> bool {
    let (digits, radix) = if let Some(hex) = s.strip_prefix("0x") {
        (hex, 16)
    } else if let Some(oct) = s.strip_prefix("0o") {
        (oct, 8)
    } else {
        return false;
    };
    !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix))
}

fn is_empty_container(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

impl Emitter<'_> {
    fn spacing(&self, level: usize) -> String {
        if level < self.options.flow_level {
            self.options.indent.repeat(level)
        } else {
            String::new()
        }
    }

    fn string(&self, s: &str) -> String {
        if is_bare(s) && !is_reserved(s) {
            return s.to_owned();
        }
        // Single-quoted scalars cannot carry escapes.
        let q = if s.chars().any(char::is_control) { '"' } else { self.options.quote };
        let mut out = String::with_capacity(s.len() + 2);
        out.push(q);
        for c in s.chars() {
            match (q, c) {
                ('\'', '\'') => out.push_str("''"),
                ('\'', _) => out.push(c),
                (_, '\\') => out.push_str("\\\\"),
                (_, '\n') => out.push_str("\\n"),
                (_, '\t') => out.push_str("\\t"),
                (_, c) if c.is_control() => out.push_str(&format!("\\u{:04x}", u32::from(c))),
                (_, c) if c == q => {
                    out.push('\\');
                    out.push(c);
                }
                (_, c) => out.push(c),
            }
        }
        out.push(q);
        out
    }

    fn value(&self, value: &Value, level: usize) -> String {
        match value {
            Value::Null => "null".to_owned(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(n),
            Value::String(s) => self.string(s),
            Value::Array(items) => self.array(items, level),
            Value::Object(map) => self.map(map, level),
        }
    }

    fn array(&self, items: &[Value], level: usize) -> String {
        let flow = self.options.flow_level;
        if items.is_empty() {
            return "[]".to_owned();
        }
        if level >= flow {
            let inner: Vec<String> = items.iter().map(|v| self.value(v, flow)).collect();
            return format!("[{}]", inner.join(", "));
        }
        items
            .iter()
            .map(|v| format!("{}- {}", self.spacing(level), self.value(v, flow)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn map(&self, map: &Map<String, Value>, level: usize) -> String {
        let flow = self.options.flow_level;
        if map.is_empty() {
            return "{}".to_owned();
        }
        let entries: Vec<String> = map
            .iter()
            .map(|(key, value)| {
                let nested = matches!(value, Value::Array(_) | Value::Object(_))
                    && !is_empty_container(value);
                let inline = !nested
                    || level + 1 >= flow
                    || self.options.always_flow.iter().any(|k| k == key);
                if inline {
                    format!("{}{}: {}", self.spacing(level), self.string(key), self.value(value, flow))
                } else {
                    format!(
                        "{}{}:\n{}",
                        self.spacing(level),
                        self.string(key),
                        self.value(value, level + 1)
                    )
                }
            })
            .collect();
        if level >= flow {
            return format!("{{ {} }}", entries.join(", "));
        }
        let newlines = (1 + self.options.extra_lines).saturating_sub(level).max(1);
        entries.join(&"\n".repeat(newlines))
    }
}

fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_owned(),
        Some(f) => format!("{f}"),
        None => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn emit(value: &Value) -> String {
        to_string(value, &EmitOptions::default())
    }

    #[test]
    fn scalars() {
        assert_eq!(emit(&json!(null)), "null");
        assert_eq!(emit(&json!(true)), "true");
        assert_eq!(emit(&json!(2.0)), "2");
        assert_eq!(emit(&json!(0.5)), "0.5");
        assert_eq!(emit(&json!("lines")), "lines");
        assert_eq!(emit(&json!("$zoom")), "$zoom");
        assert_eq!(emit(&json!("global.color.water")), "global.color.water");
        assert_eq!(emit(&json!("#fff")), "\"#fff\"");
        assert_eq!(emit(&json!("1px")), "1px");
        assert_eq!(emit(&json!("-1px")), "\"-1px\"");
        assert_eq!(emit(&json!("")), "\"\"");
        assert_eq!(emit(&json!("true")), "\"true\"");
        assert_eq!(emit(&json!("12")), "\"12\"");
        assert_eq!(emit(&json!("0x1F")), "\"0x1F\"");
        assert_eq!(emit(&json!("0o17")), "\"0o17\"");
        assert_eq!(emit(&json!("0xZZ")), "0xZZ");
    }

    #[test]
    fn quoting_escapes() {
        assert_eq!(emit(&json!("a \"b\"\nc")), "\"a \\\"b\\\"\\nc\"");
        let single = EmitOptions { quote: '\'', ..EmitOptions::default() };
        assert_eq!(to_string(&json!("it's"), &single), "'it''s'");
        assert_eq!(to_string(&json!("a\nb"), &single), "\"a\\nb\"");
    }

    #[test]
    fn scalar_map_is_one_line_per_entry() {
        let value = json!({ "a": 1, "b": "x y", "c": false });
        assert_eq!(emit(&value), "a: 1\nb: \"x y\"\nc: false");
    }

    #[test]
    fn nested_blocks_indent() {
        let value = json!({ "layers": { "water": { "order": 1 } }, "list": [1, [2, 3]] });
        assert_eq!(
            emit(&value),
            "layers:\n  water:\n    order: 1\nlist:\n  - 1\n  - [2, 3]"
        );
    }

    #[test]
    fn empty_containers_are_inline() {
        let value = json!({ "a": {}, "b": [] });
        assert_eq!(emit(&value), "a: {}\nb: []");
        assert_eq!(emit(&json!({})), "{}");
    }

    #[test]
    fn flow_level_switches_to_inline() {
        let options = EmitOptions { flow_level: 2, ..EmitOptions::default() };
        let value = json!({ "a": { "b": { "c": 1, "d": [1, 2] } } });
        assert_eq!(to_string(&value, &options), "a:\n  b: { c: 1, d: [1, 2] }");
    }

    #[test]
    fn always_flow_keys_inline_at_any_depth() {
        let options = EmitOptions {
            always_flow: vec!["data".to_owned()],
            ..EmitOptions::default()
        };
        let value = json!({ "water": { "data": { "source": "osm", "layer": "water" } } });
        assert_eq!(
            to_string(&value, &options),
            "water:\n  data: { source: osm, layer: water }"
        );
    }

    #[test]
    fn blank_lines_shrink_with_depth() {
        let options = EmitOptions { extra_lines: 2, ..EmitOptions::default() };
        let value = json!({ "a": { "x": 1, "y": 2 }, "b": { "z": { "p": 1, "q": 2 } } });
        assert_eq!(
            to_string(&value, &options),
            "a:\n  x: 1\n\n  y: 2\n\n\nb:\n  z:\n    p: 1\n    q: 2"
        );
    }

    #[test]
    fn bare_token_rule() {
        assert!(is_bare("name_en"));
        assert!(is_bare("name-en.x"));
        assert!(!is_bare("name:latin"));
        assert!(!is_bare(".x"));
        assert!(!is_bare("a b"));
    }
}
