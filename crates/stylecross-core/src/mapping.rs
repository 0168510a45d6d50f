// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Declarative property tables and the mapper that applies them.
//!
//! Each table maps a source property name to a [`Rule`]. One source bag is run
//! through several tables, each populating a different region of the output.
//! The mapper remembers every key any consulted table knows about, so whatever
//! is left over can be reported once per layer.

use std::collections::BTreeSet;

use crate::model::PropertyBag;
use crate::stops;
use crate::transform::{self, Transform};

/// How one source property converts.
#[derive(Clone, Copy)]
pub struct Rule {
    /// Target property name.
    pub target: &'static str,
    /// Applied to each zoom-resolved value.
    pub transform: Transform,
    /// `false` for discrete values that must not be blended between stops.
    pub interpolate: bool,
}

impl Rule {
    /// Rename only.
    pub const fn rename(target: &'static str) -> Self {
        Self {
            target,
            transform: transform::identity,
            interpolate: true,
        }
    }

    /// Rename and transform.
    pub const fn with(target: &'static str, transform: Transform) -> Self {
        Self {
            target,
            transform,
            interpolate: true,
        }
    }

    /// Rename and transform; zoom functions collapse to their first stop.
    pub const fn fixed(target: &'static str, transform: Transform) -> Self {
        Self {
            target,
            transform,
            interpolate: false,
        }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("target", &self.target)
            .field("interpolate", &self.interpolate)
            .finish_non_exhaustive()
    }
}

/// A mapping table: source key → rule.
pub type Table = &'static [(&'static str, Rule)];

/// Properties set on the style object itself rather than its draw block.
pub const BASE: Table = &[("line-dasharray", Rule::fixed("dash", transform::clamp_dash))];

/// Generic draw-block properties.
pub const DRAW: Table = &[
    ("line-cap", Rule::rename("cap")),
    ("line-join", Rule::rename("join")),
    ("line-miter-limit", Rule::rename("miter_limit")),
    ("line-color", Rule::rename("color")),
    ("line-opacity", Rule::rename("alpha")),
    ("line-width", Rule::with("width", transform::px)),
    ("fill-color", Rule::rename("color")),
    ("fill-opacity", Rule::rename("alpha")),
    ("fill-extrusion-color", Rule::rename("color")),
    ("fill-extrusion-opacity", Rule::rename("alpha")),
    ("circle-radius", Rule::with("size", transform::px)),
    ("icon-size", Rule::with("size", transform::percent)),
    ("icon-image", Rule::rename("sprite")),
    ("icon-allow-overlap", Rule::with("collide", transform::invert)),
    ("icon-padding", Rule::with("buffer", transform::px_pair)),
    ("icon-ignore-placement", Rule::with("collide", transform::invert)),
    ("icon-rotation-alignment", Rule::with("angle", transform::rotation_alignment)),
    ("icon-color", Rule::rename("color")),
    ("icon-opacity", Rule::rename("alpha")),
    ("icon-translate", Rule::with("offset", transform::px)),
    ("symbol-placement", Rule::with("placement", transform::placement)),
    ("symbol-spacing", Rule::with("placement_spacing", transform::px)),
    ("visibility", Rule::with("visible", transform::visibility)),
];

/// Label placement and content.
pub const TEXT: Table = &[
    ("text-field", Rule::with("text_source", transform::text_source)),
    ("text-max-width", Rule::rename("text_wrap")),
    ("text-optional", Rule::rename("optional")),
    ("text-offset", Rule::with("offset", transform::px)),
    ("text-anchor", Rule::with("anchor", transform::flip_anchor)),
    ("text-padding", Rule::with("buffer", transform::px_pair)),
    ("text-allow-overlap", Rule::with("collide", transform::invert)),
    ("text-pitch-alignment", Rule::with("flat", transform::pitch_alignment)),
    ("text-justify", Rule::rename("align")),
];

/// Label font.
pub const FONT: Table = &[
    ("text-font", Rule::rename("family")),
    ("text-size", Rule::with("size", transform::px)),
    ("text-transform", Rule::rename("transform")),
    ("text-color", Rule::rename("fill")),
    ("text-opacity", Rule::rename("alpha")),
];

/// Label halo, nested under the font as `stroke`.
pub const FONT_STROKE: Table = &[
    ("text-halo-width", Rule::with("width", transform::px)),
    ("text-halo-color", Rule::rename("color")),
];

/// Outline block for polygons and icons.
pub const OUTLINE: Table = &[
    ("fill-outline-color", Rule::rename("color")),
    ("icon-halo-color", Rule::rename("color")),
    ("icon-halo-width", Rule::with("width", transform::px)),
];

/// How an [`UNSUPPORTED`] entry matches a property name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match {
    /// Whole name.
    Exact,
    /// Name starts with the entry.
    Prefix,
}

/// Properties with no target equivalent. They are dropped without a diagnostic.
pub const UNSUPPORTED: &[(&str, Match)] = &[
    ("line-gap-width", Match::Exact),
    ("line-translate", Match::Prefix),
    ("line-blur", Match::Exact),
    ("line-pattern", Match::Exact),
    ("fill-antialias", Match::Exact),
    ("fill-pattern", Match::Exact),
    ("fill-translate", Match::Prefix),
    ("text-line-height", Match::Exact),
    ("text-letter-spacing", Match::Exact),
    ("text-max-angle", Match::Exact),
    ("text-halo-blur", Match::Exact),
    ("icon-halo-blur", Match::Exact),
    ("circle-blur", Match::Exact),
    ("circle-opacity", Match::Exact),
    ("circle-stroke-opacity", Match::Exact),
    ("background-opacity", Match::Exact),
    ("raster-opacity", Match::Exact),
    ("heatmap-opacity", Match::Exact),
];

/// Whether `key` is a known-unsupported property.
pub fn is_unsupported(key: &str) -> bool {
    UNSUPPORTED.iter().any(|(name, mode)| match mode {
        Match::Exact => key == *name,
        Match::Prefix => key.starts_with(name),
    })
}

/// Map `bag` through one table.
///
/// Keys are visited in `bag` order; when several source keys share a target the
/// last one wins. Returns the converted bag and the keys the table recognizes.
pub fn map_properties(bag: &PropertyBag, table: Table) -> (PropertyBag, Vec<&'static str>) {
    let mut out = PropertyBag::new();
    for (key, value) in bag {
        if let Some((_, rule)) = table.iter().find(|(name, _)| *name == key.as_str()) {
            out.insert(
                rule.target.to_owned(),
                stops::resolve(value, rule.transform, rule.interpolate),
            );
        }
    }
    (out, table.iter().map(|(name, _)| *name).collect())
}

/// Runs one source bag through several tables and tracks recognized keys.
#[derive(Debug)]
pub struct PropertyMapper<'a> {
    bag: &'a PropertyBag,
    known: BTreeSet<&'static str>,
}

impl<'a> PropertyMapper<'a> {
    /// Start mapping `bag`.
    pub fn new(bag: &'a PropertyBag) -> Self {
        Self {
            bag,
            known: BTreeSet::new(),
        }
    }

    /// Map through `table`, remembering its keys as known.
    pub fn map(&mut self, table: Table) -> PropertyBag {
        let (out, keys) = map_properties(self.bag, table);
        self.known.extend(keys);
        out
    }

    /// Keys of the bag no consulted table knows and that are not known-unsupported, in bag order.
    pub fn unhandled(&self) -> Vec<&'a str> {
        self.bag
            .keys()
            .map(String::as_str)
            .filter(|k| !self.known.contains(*k) && !is_unsupported(k))
            .collect()
    }
}
