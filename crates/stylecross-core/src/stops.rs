// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Zoom functions and stop interpolation.
//!
//! A zoom function `{ "base": 1.5, "stops": [[12, 2], [16, 6]] }` becomes a
//! per-zoom table `[[12, f(12)], [13, f(13)], ..., [16, 6]]`, one row per unit
//! zoom step, which the target renderer interpolates linearly.

use serde_json::Value;

use crate::number::number_value;
use crate::transform::Transform;

/// Widest breakpoint interval that is expanded row by row. Wider intervals keep
/// only their breakpoints; real styles stay within zoom 0..=24.
pub const MAX_ZOOM_SPAN: f64 = 32.0;

/// A property value: either a literal or a zoom-keyed stop list.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoomFunction<'a> {
    /// Not zoom-dependent.
    Literal(&'a Value),
    /// Stops in source order with the exponential base (1 = linear).
    Stops {
        /// `(zoom, value)` breakpoints. Zoom keys are kept raw; they are normally numbers.
        stops: Vec<(&'a Value, &'a Value)>,
        /// Exponential base.
        base: f64,
    },
}

impl<'a> ZoomFunction<'a> {
    /// Classify a raw property value.
    ///
    /// Anything that is not an object with a non-empty `stops` list of pairs is a literal.
    pub fn parse(value: &'a Value) -> Self {
        let Some(raw_stops) = value.get("stops").and_then(Value::as_array) else {
            return Self::Literal(value);
        };
        let stops: Vec<_> = raw_stops
            .iter()
            .filter_map(|stop| match stop.as_array().map(Vec::as_slice) {
                Some([zoom, value, ..]) => Some((zoom, value)),
                _ => None,
            })
            .collect();
        if stops.is_empty() {
            return Self::Literal(value);
        }
        let base = value
            .get("base")
            .and_then(Value::as_f64)
            .filter(|b| *b != 0.0 && b.is_finite())
            .unwrap_or(1.0);
        Self::Stops { stops, base }
    }

    /// Resolve to a target value.
    ///
    /// Literals are transformed as-is. With `interpolate == false` only the first
    /// stop's value survives. Numeric stop lists are expanded by
    /// [`interpolate_stops`]; other stop lists are transformed stop by stop.
    pub fn resolve(&self, transform: Transform, interpolate: bool) -> Value {
        match self {
            Self::Literal(value) => transform(value),
            Self::Stops { stops, .. } if !interpolate => transform(stops[0].1),
            Self::Stops { stops, base } => {
                let numeric: Option<Vec<(f64, f64)>> = stops
                    .iter()
                    .map(|(z, v)| Some((z.as_f64()?, v.as_f64()?)))
                    .collect();
                match numeric {
                    Some(points) => rows_value(interpolate_stops(&points, *base, transform)),
                    None => Value::Array(
                        stops
                            .iter()
                            .map(|(z, v)| Value::Array(vec![(*z).clone(), transform(v)]))
                            .collect(),
                    ),
                }
            }
        }
    }
}

/// Resolve a raw property value in one step. See [`ZoomFunction::resolve`].
pub fn resolve(value: &Value, transform: Transform, interpolate: bool) -> Value {
    ZoomFunction::parse(value).resolve(transform, interpolate)
}

/// Normalized exponential progress of `z` between `z0` and `z1`.
///
/// 0 at `z0`, 1 at `z1`; linear for `base == 1`. A zero-width interval yields 0.
pub fn ease_factor(z: f64, base: f64, z0: f64, z1: f64) -> f64 {
    let difference = z1 - z0;
    let progress = z - z0;
    if difference == 0.0 {
        0.0
    } else if base == 1.0 {
        progress / difference
    } else {
        (base.powf(progress) - 1.0) / (base.powf(difference) - 1.0)
    }
}

/// Round to two decimal places.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Expand numeric breakpoints into one row per zoom step.
///
/// Each pair `(z0, v0)-(z1, v1)` contributes rows at `z0, z0+1, ...` strictly below
/// `z1`; the last breakpoint is appended as-is so the table is right-inclusive.
/// Interpolated values are rounded to two decimals before `transform` runs.
/// A pair wider than [`MAX_ZOOM_SPAN`] contributes only its `z0` breakpoint.
pub fn interpolate_stops(stops: &[(f64, f64)], base: f64, transform: Transform) -> Vec<(f64, Value)> {
    let mut rows = Vec::new();
    for pair in stops.windows(2) {
        let ((z0, v0), (z1, v1)) = (pair[0], pair[1]);
        let span = z1 - z0;
        if span > MAX_ZOOM_SPAN {
            rows.push((z0, transform(&number_value(v0))));
            continue;
        }
        // count offsets rather than accumulating z, which stalls past 2^53
        let mut offset = 0.0;
        while offset < span {
            let z = z0 + offset;
            if z >= z1 {
                break;
            }
            let value = round2(v0 + (v1 - v0) * ease_factor(z, base, z0, z1));
            rows.push((z, transform(&number_value(value))));
            offset += 1.0;
        }
    }
    if let Some(&(z, v)) = stops.last() {
        rows.push((z, transform(&number_value(v))));
    }
    rows
}

fn rows_value(rows: Vec<(f64, Value)>) -> Value {
    Value::Array(
        rows.into_iter()
            .map(|(z, v)| Value::Array(vec![number_value(z), v]))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{identity, px};
    use serde_json::json;

    #[test]
    fn literal_passes_through_transform() {
        assert_eq!(resolve(&json!(2), px, true), json!("2px"));
        assert_eq!(resolve(&json!(2), px, false), json!("2px"));
    }

    #[test]
    fn linear_stops_expand_per_zoom() {
        let value = json!({ "stops": [[12, 2], [16, 6]] });
        assert_eq!(
            resolve(&value, px, true),
            json!([[12, "2px"], [13, "3px"], [14, "4px"], [15, "5px"], [16, "6px"]])
        );
    }

    #[test]
    fn exponential_stops_round_to_two_places() {
        let value = json!({ "base": 2, "stops": [[0, 0], [2, 3]] });
        // f(1) = (2^1 - 1) / (2^2 - 1) = 1/3
        assert_eq!(resolve(&value, identity, true), json!([[0, 0], [1, 1], [2, 3]]));
        let value = json!({ "base": 1.4, "stops": [[10, 1], [12, 2]] });
        // f(11) = 0.4 / 0.96
        assert_eq!(resolve(&value, identity, true), json!([[10, 1], [11, 1.42], [12, 2]]));
    }

    #[test]
    fn no_interpolate_keeps_first_stop() {
        let value = json!({ "stops": [[10, [2, 1]], [14, [4, 2]]] });
        assert_eq!(resolve(&value, identity, false), json!([2, 1]));
    }

    #[test]
    fn non_numeric_stops_map_one_to_one() {
        let value = json!({ "stops": [[8, "#fff"], [12, "#000"]] });
        assert_eq!(resolve(&value, identity, true), json!([[8, "#fff"], [12, "#000"]]));
    }

    #[test]
    fn zero_width_interval_contributes_zero() {
        assert_eq!(ease_factor(5.0, 1.0, 5.0, 5.0), 0.0);
        assert_eq!(ease_factor(5.0, 2.0, 5.0, 5.0), 0.0);
        let rows = interpolate_stops(&[(5.0, 1.0), (5.0, 9.0)], 1.0, identity);
        assert_eq!(rows, vec![(5.0, json!(9))]);
    }

    #[test]
    fn fractional_start_steps_by_one() {
        let rows = interpolate_stops(&[(13.5, 0.0), (15.0, 3.0)], 1.0, identity);
        let zooms: Vec<f64> = rows.iter().map(|(z, _)| *z).collect();
        assert_eq!(zooms, vec![13.5, 14.5, 15.0]);
    }

    #[test]
    fn oversized_span_keeps_breakpoints_only() {
        let value = json!({ "stops": [[0, 0], [3.0e7, 1]] });
        assert_eq!(resolve(&value, identity, true), json!([[0, 0], [30000000, 1]]));

        // adding one no longer moves a zoom this large
        let far = 9_007_199_254_740_992.0;
        let rows = interpolate_stops(&[(far, 0.0), (far + 4.0, 4.0)], 1.0, identity);
        assert!(rows.len() <= 5);
        assert_eq!(rows.last(), Some(&(far + 4.0, json!(4))));
    }

    #[test]
    fn span_at_the_limit_is_expanded() {
        let rows = interpolate_stops(&[(0.0, 0.0), (MAX_ZOOM_SPAN, 32.0)], 1.0, identity);
        assert_eq!(rows.len(), 33);
    }

    #[test]
    fn single_stop_is_emitted() {
        let value = json!({ "stops": [[4, 7]] });
        assert_eq!(resolve(&value, identity, true), json!([[4, 7]]));
    }

    #[test]
    fn zero_base_falls_back_to_linear() {
        let value = json!({ "base": 0, "stops": [[0, 0], [2, 2]] });
        assert_eq!(resolve(&value, identity, true), json!([[0, 0], [1, 1], [2, 2]]));
    }
}
