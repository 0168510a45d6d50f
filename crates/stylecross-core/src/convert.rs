// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Whole-document conversion.
//!
//! Walks the source layers in order and assembles the scene: background,
//! sources, filters (with zoom ranges folded in), draw blocks or named styles,
//! the optional colour palette, and `ref` sub-layers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, TracingSink};
use crate::error::ConvertError;
use crate::filter;
use crate::layer::{walk_layer, DrawKind, TargetStyle, LINES_INLAY, POLYGONS_INLAY};
use crate::model::{LayerType, SourceLayer, StyleDocument};
use crate::scene::{Background, DataBinding, NamedStyle, Scene, TargetLayer};

/// Source name used when a layer does not name one.
pub const DEFAULT_SOURCE: &str = "mapfit";

/// Conversion knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Lift literal colours into `global.color` and reference them from draw blocks.
    pub global_colors: bool,
    /// Data source for layers without a `source`.
    pub default_source: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            global_colors: false,
            default_source: DEFAULT_SOURCE.to_owned(),
        }
    }
}

/// Result of one run: the scene plus everything reported along the way.
#[derive(Debug, Clone, Default)]
pub struct Conversion {
    /// Converted document.
    pub scene: Scene,
    /// Recoverable problems, in the order encountered.
    pub diagnostics: Vec<Diagnostic>,
}

/// Convert a document, collecting diagnostics (each is also logged via `tracing`).
pub fn convert(document: &StyleDocument, options: &ConvertOptions) -> Conversion {
    let mut sink = TracingSink::new(Vec::new());
    let scene = convert_with_sink(document, options, &mut sink);
    Conversion {
        scene,
        diagnostics: sink.into_inner(),
    }
}

/// Parse and convert a JSON document. Fails only when the document structure is broken.
pub fn convert_json(value: &Value, options: &ConvertOptions) -> Result<Conversion, ConvertError> {
    let document = StyleDocument::from_value(value)?;
    Ok(convert(&document, options))
}

/// Forwards to the caller's sink and counts for the run summary.
struct Counted<'s, S: ?Sized> {
    inner: &'s mut S,
    reported: usize,
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Counted<'_, S> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.reported += 1;
        self.inner.report(diagnostic);
    }
}

/// Convert a document, reporting diagnostics to `sink`.
pub fn convert_with_sink<S>(document: &StyleDocument, options: &ConvertOptions, sink: &mut S) -> Scene
where
    S: DiagnosticSink + ?Sized,
{
    let sink = &mut Counted { inner: sink, reported: 0 };
    let mut scene = Scene::default();
    if options.global_colors {
        scene.global.insert("color".to_owned(), Value::Object(serde_json::Map::new()));
    }
    scene
        .styles
        .insert(LINES_INLAY.to_owned(), NamedStyle::inlay(DrawKind::Lines));
    scene
        .styles
        .insert(POLYGONS_INLAY.to_owned(), NamedStyle::inlay(DrawKind::Polygons));

    // (parent id, child id, child) attached once every top-level layer exists
    let mut pending: Vec<(String, String, TargetLayer)> = Vec::new();

    for (order, source) in document.layers.iter().enumerate() {
        let layer_type = match effective_type(document, source) {
            Ok(layer_type) => layer_type,
            Err(parent) => {
                sink.report(Diagnostic::new(
                    &source.id,
                    DiagnosticKind::MissingParentLayer,
                    format!("Sub-layer references missing layer `{parent}`; dropped"),
                ));
                continue;
            }
        };
        if layer_type == Some(LayerType::Background) {
            set_background(&mut scene, source, sink);
            continue;
        }

        if let Some(name) = &source.source {
            scene
                .sources
                .entry(name.clone())
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
        }

        let mut target = TargetLayer::default();
        if source.reference.is_none() {
            target.data = Some(DataBinding {
                source: source
                    .source
                    .clone()
                    .unwrap_or_else(|| options.default_source.clone()),
                layer: source.source_layer.clone(),
            });
        }

        let translated = source
            .filter
            .as_ref()
            .map(|raw| filter::translate_raw(raw, &source.id, sink));
        target.filter = if source.minzoom.is_some() || source.maxzoom.is_some() {
            Some(filter::with_zoom_range(translated, source.minzoom, source.maxzoom))
        } else {
            translated
        };

        let mut style = walk_layer(source, layer_type, order, sink);
        if options.global_colors {
            lift_colors(&mut scene, &source.id, &mut style);
        }

        if style.needs_named_style() {
            target
                .draw
                .insert(source.id.clone(), Value::Object(serde_json::Map::new()));
            scene.styles.insert(source.id.clone(), NamedStyle::from(style));
        } else if let Some(kind) = style.base {
            target
                .draw
                .insert(kind.as_str().to_owned(), Value::Object(style.draw));
        }

        match &source.reference {
            Some(parent) => pending.push((parent.clone(), source.id.clone(), target)),
            None => scene.layers.insert(source.id.clone(), target),
        }
    }

    for (parent, id, child) in pending {
        match scene.layers.get_mut(&parent) {
            Some(owner) => owner.sublayers.push((id, child)),
            None => sink.report(Diagnostic::new(
                &id,
                DiagnosticKind::MissingParentLayer,
                format!("Sub-layer references missing layer `{parent}`; dropped"),
            )),
        }
    }

    tracing::info!(
        layers = scene.layers.len(),
        styles = scene.styles.len(),
        sources = scene.sources.len(),
        diagnostics = sink.reported,
        "converted style document"
    );
    scene
}

/// Declared type, or the referenced layer's type for `ref` layers.
///
/// `Err` carries the parent id when a `ref` points at no layer at all.
fn effective_type<'a>(document: &StyleDocument, layer: &'a SourceLayer) -> Result<Option<LayerType>, &'a str> {
    match (&layer.layer_type, &layer.reference) {
        (Some(ty), _) => Ok(LayerType::parse(ty)),
        (None, Some(parent)) => match document.layer(parent) {
            Some(owner) => Ok(owner.layer_type.as_deref().and_then(LayerType::parse)),
            None => Err(parent),
        },
        (None, None) => Ok(None),
    }
}

fn set_background<S>(scene: &mut Scene, layer: &SourceLayer, sink: &mut S)
where
    S: DiagnosticSink + ?Sized,
{
    match layer.paint.get("background-color") {
        Some(color) => {
            scene.scene.background = Some(Background {
                color: color.clone(),
            });
        }
        None => sink.report(Diagnostic::new(
            &layer.id,
            DiagnosticKind::MissingBackgroundColor,
            "Background layer has no background-color",
        )),
    }
}

/// Literal (non-table) values are lifted; zoom tables stay inline.
fn is_literal(value: &Value) -> bool {
    !value.is_array() && !value.is_object() && !value.is_null()
}

/// Move literal draw/font colours into the palette, leaving references behind.
fn lift_colors(scene: &mut Scene, id: &str, style: &mut TargetStyle) {
    if let Some(color) = style.draw.get_mut("color") {
        if is_literal(color) {
            *color = scene.lift_color(id, color.take());
        }
    }

    let font = if style.draw.contains_key("text") {
        style.draw.get_mut("text").and_then(|text| text.get_mut("font"))
    } else {
        style.draw.get_mut("font")
    };
    let Some(Value::Object(font)) = font else {
        return;
    };
    if let Some(fill) = font.get_mut("fill") {
        if is_literal(fill) {
            *fill = scene.lift_color(&format!("{id}_text"), fill.take());
        }
    }
    if let Some(Value::Object(stroke)) = font.get_mut("stroke") {
        if let Some(color) = stroke.get_mut("color") {
            if is_literal(color) {
                *color = scene.lift_color(&format!("{id}_halo"), color.take());
            }
        }
    }
}
