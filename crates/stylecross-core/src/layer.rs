// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-layer conversion: one source layer → one target style descriptor.

use serde::Serialize;
use serde_json::Value;

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::mapping::{self, PropertyMapper};
use crate::model::{LayerType, PropertyBag, SourceLayer};
use crate::number::coerce_f64;

/// Target rendering category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawKind {
    /// Stroked lines.
    Lines,
    /// Filled (optionally extruded) polygons.
    Polygons,
    /// Sprites and circles, optionally with an attached label.
    Points,
    /// Free-standing labels.
    Text,
    /// Raster tiles.
    Raster,
}

impl DrawKind {
    /// Name used as the draw-block key and as a style `base`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lines => "lines",
            Self::Polygons => "polygons",
            Self::Points => "points",
            Self::Text => "text",
            Self::Raster => "raster",
        }
    }

    /// Shared semi-transparent style for this kind, if there is one.
    pub const fn inlay_style(self) -> Option<&'static str> {
        match self {
            Self::Lines => Some(LINES_INLAY),
            Self::Polygons => Some(POLYGONS_INLAY),
            _ => None,
        }
    }
}

/// Shared style for semi-transparent lines.
pub const LINES_INLAY: &str = "lines-inlay";
/// Shared style for semi-transparent polygons.
pub const POLYGONS_INLAY: &str = "polygons-inlay";

/// Blend mode of a named style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Blend {
    /// Drawn over opaque geometry with alpha blending.
    Inlay,
}

/// Converted layer: draw kind, draw block, and style-level directives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetStyle {
    /// Dash pattern; forces a named style.
    pub dash: Option<Value>,
    /// Draw kind; `None` when the layer type was not recognized.
    pub base: Option<DrawKind>,
    /// Blend mode; forces a named style.
    pub blend: Option<Blend>,
    /// Draw block.
    pub draw: PropertyBag,
}

impl TargetStyle {
    /// Whether the draw block cannot be embedded inline in the layer.
    pub fn needs_named_style(&self) -> bool {
        self.blend.is_some() || self.dash.is_some()
    }
}

/// `alpha` that is present and does not read as exactly 1.
///
/// Zoom tables and arrays never read as 1, so a zoom-dependent alpha always
/// counts as translucent even if every stop is 1.
fn is_translucent(alpha: Option<&Value>) -> bool {
    match alpha {
        None | Some(Value::Null) => false,
        Some(value) => coerce_f64(value) != Some(1.0),
    }
}

fn insert_default(bag: &mut PropertyBag, key: &str, value: &str) {
    if !bag.contains_key(key) {
        bag.insert(key.to_owned(), Value::from(value));
    }
}

/// Convert one layer.
///
/// `layer_type` is the effective type (a `ref` layer borrows its parent's); `order`
/// is the layer's position in the source list and becomes the draw order of line
/// and polygon layers. Background layers are handled by the caller.
pub fn walk_layer<S>(
    layer: &SourceLayer,
    layer_type: Option<LayerType>,
    order: usize,
    sink: &mut S,
) -> TargetStyle
where
    S: DiagnosticSink + ?Sized,
{
    let props = layer.merged_properties();
    let mut mapper = PropertyMapper::new(&props);

    let mut base_props = mapper.map(mapping::BASE);
    let dash = base_props.remove("dash");

    let mut base = layer_type.and_then(LayerType::draw_kind);
    if base.is_none() {
        let shown = layer.layer_type.as_deref().unwrap_or("<none>");
        sink.report(Diagnostic::new(
            &layer.id,
            DiagnosticKind::UnknownLayerType,
            format!("Unrecognised layer type: {shown}"),
        ));
    }

    let mut draw = mapper.map(mapping::DRAW);
    let mut text = mapper.map(mapping::TEXT);
    let mut font = mapper.map(mapping::FONT);
    let stroke = mapper.map(mapping::FONT_STROKE);

    if !font.is_empty() {
        if !stroke.is_empty() {
            font.insert("stroke".to_owned(), Value::Object(stroke));
        }
        insert_default(&mut font, "size", "14px");
        text.insert("font".to_owned(), Value::Object(font));
    }

    if layer_type == Some(LayerType::Symbol) {
        if !text.is_empty() {
            // source default is centered, target default is not
            insert_default(&mut text, "anchor", "center");
        }
        if draw.contains_key("sprite") {
            base = Some(DrawKind::Points);
            if !text.is_empty() {
                draw.insert("text".to_owned(), Value::Object(text));
            }
        } else {
            base = Some(DrawKind::Text);
            if let Some(spacing) = draw.shift_remove("placement_spacing") {
                draw.insert("repeat_distance".to_owned(), spacing);
            }
            draw.shift_remove("placement");
            draw.extend(text);
        }
    } else if !text.is_empty() {
        sink.report(Diagnostic::new(
            &layer.id,
            DiagnosticKind::IgnoredTextProperties,
            "Ignoring text properties set on non-symbol layer",
        ));
    }

    let mut outline = mapper.map(mapping::OUTLINE);
    if !outline.is_empty() {
        insert_default(&mut outline, "width", "1px");
        draw.insert("outline".to_owned(), Value::Object(outline));
    }

    if layer_type == Some(LayerType::FillExtrusion) {
        draw.insert("extrude".to_owned(), Value::Bool(true));
    }

    if matches!(base, Some(DrawKind::Lines | DrawKind::Polygons)) {
        draw.insert("order".to_owned(), Value::from(order));
    }

    let mut blend = None;
    if is_translucent(draw.get("alpha")) {
        if dash.is_some() {
            blend = Some(Blend::Inlay);
        } else if let Some(style) = base.and_then(DrawKind::inlay_style) {
            draw.insert("style".to_owned(), Value::from(style));
        }
    }

    let unhandled = mapper.unhandled();
    if !unhandled.is_empty() {
        sink.report(Diagnostic::new(
            &layer.id,
            DiagnosticKind::UnhandledProperties,
            format!("Unhandled style properties: {}", unhandled.join(",")),
        ));
    }

    if base == Some(DrawKind::Lines) {
        insert_default(&mut draw, "width", "1px");
    }

    tracing::debug!(layer = %layer.id, base = ?base, keys = draw.len(), "walked layer");
    TargetStyle {
        dash,
        base,
        blend,
        draw,
    }
}
