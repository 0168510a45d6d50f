// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Value transforms applied after zoom resolution.
//!
//! Every transform is a pure function of one already zoom-resolved value.
//! Inputs a transform has no reading for are returned unchanged.

use serde_json::Value;

use crate::number::{coerce_f64, format_f64, is_truthy, number_value, scalar_text};

/// Signature shared by all transforms.
pub type Transform = fn(&Value) -> Value;

/// Minimum dash segment length; shorter segments render as gaps.
pub const MIN_DASH: f64 = 0.1;

/// No-op.
pub fn identity(value: &Value) -> Value {
    value.clone()
}

/// Append a `px` unit; applied element-wise to arrays.
pub fn px(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(px).collect()),
        Value::Number(_) | Value::String(_) => {
            scalar_text(value).map_or_else(|| value.clone(), |t| Value::String(format!("{t}px")))
        }
        _ => value.clone(),
    }
}

/// `x` → `["xpx", "xpx"]`, used for symmetric buffers.
pub fn px_pair(value: &Value) -> Value {
    let side = px(value);
    Value::Array(vec![side.clone(), side])
}

/// Scale factor → percentage string (`0.5` → `"50%"`).
pub fn percent(value: &Value) -> Value {
    coerce_f64(value).map_or_else(
        || value.clone(),
        |f| Value::String(format!("{}%", format_f64(f * 100.0))),
    )
}

/// Boolean inversion of a loosely typed flag.
pub fn invert(value: &Value) -> Value {
    Value::Bool(!is_truthy(value))
}

/// `"map"` → `"auto"` (rotate with the map), anything else → `0`.
pub fn rotation_alignment(value: &Value) -> Value {
    if value == "map" {
        Value::from("auto")
    } else {
        Value::from(0)
    }
}

/// `"point"` → `"vertex"`, anything else → `"spaced"`.
pub fn placement(value: &Value) -> Value {
    Value::from(if value == "point" { "vertex" } else { "spaced" })
}

/// `"visible"` → `true`, anything else → `false`.
pub fn visibility(value: &Value) -> Value {
    Value::Bool(value == "visible")
}

/// `"map"` → `true`: labels lie flat on the map plane.
pub fn pitch_alignment(value: &Value) -> Value {
    Value::Bool(value == "map")
}

/// Swap top/bottom and left/right in a hyphenated anchor keyword.
///
/// The two schemas measure anchors from opposite sides, so `top-left` in the
/// source is `bottom-right` in the target.
pub fn flip_anchor(value: &Value) -> Value {
    let Some(anchor) = value.as_str() else {
        return value.clone();
    };
    let flipped: Vec<&str> = anchor
        .split('-')
        .map(|part| match part {
            "top" => "bottom",
            "bottom" => "top",
            "left" => "right",
            "right" => "left",
            other => other,
        })
        .collect();
    Value::String(flipped.join("-"))
}

/// Strip `{}` template braces from a text field and rename `name_en` to `name`.
pub fn text_source(value: &Value) -> Value {
    let Some(template) = value.as_str() else {
        return value.clone();
    };
    let stripped: String = template.chars().filter(|c| !matches!(c, '{' | '}')).collect();
    Value::String(stripped.replacen("name_en", "name", 1))
}

/// Clamp each dash length to at least [`MIN_DASH`].
pub fn clamp_dash(value: &Value) -> Value {
    let Some(items) = value.as_array() else {
        return value.clone();
    };
    Value::Array(
        items
            .iter()
            .map(|d| d.as_f64().map_or_else(|| d.clone(), |f| number_value(f.max(MIN_DASH))))
            .collect(),
    )
}
