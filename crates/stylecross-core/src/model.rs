// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Source-side data model: the Mapbox GL style document and its layers.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ConvertError;
use crate::layer::DrawKind;

/// Ordered key → value property bag (paint, layout, or a converted draw block).
pub type PropertyBag = Map<String, Value>;

/// Source style document. Only `layers` is consumed.
#[derive(Debug, Clone, Default)]
pub struct StyleDocument {
    /// Layers in drawing order.
    pub layers: Vec<SourceLayer>,
}

impl StyleDocument {
    /// Parse a document from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConvertError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Read a document from an already parsed JSON tree.
    ///
    /// Fails when `layers` is missing or not a list, or when an entry is not a layer object.
    pub fn from_value(value: &Value) -> Result<Self, ConvertError> {
        let entries = value
            .get("layers")
            .and_then(Value::as_array)
            .ok_or(ConvertError::MissingLayers)?;
        let layers = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                SourceLayer::deserialize(entry).map_err(|e| ConvertError::InvalidLayer {
                    index,
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { layers })
    }

    /// Find a layer by id.
    pub fn layer(&self, id: &str) -> Option<&SourceLayer> {
        self.layers.iter().find(|l| l.id == id)
    }
}

/// One entry of the source `layers` list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceLayer {
    /// Unique layer id.
    pub id: String,
    /// Rendering type as written (`line`, `fill`, ...). Missing on `ref` layers.
    #[serde(rename = "type", default)]
    pub layer_type: Option<String>,
    /// Data source name.
    #[serde(default)]
    pub source: Option<String>,
    /// Layer inside the data source.
    #[serde(rename = "source-layer", default)]
    pub source_layer: Option<String>,
    /// Lowest zoom the layer is visible at.
    #[serde(default)]
    pub minzoom: Option<f64>,
    /// Zoom at and above which the layer is hidden.
    #[serde(default)]
    pub maxzoom: Option<f64>,
    /// Prefix-notation filter expression.
    #[serde(default)]
    pub filter: Option<Value>,
    /// Deprecated: id of a layer whose type and data binding this one shares.
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
    /// Paint properties.
    #[serde(default)]
    pub paint: PropertyBag,
    /// Layout properties.
    #[serde(default)]
    pub layout: PropertyBag,
}

impl SourceLayer {
    /// Paint and layout merged into one bag; layout wins on collisions.
    pub fn merged_properties(&self) -> PropertyBag {
        let mut merged = self.paint.clone();
        for (key, value) in &self.layout {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}

/// Source layer rendering type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerType {
    /// Stroked lines.
    Line,
    /// Filled polygons.
    Fill,
    /// Extruded polygons.
    FillExtrusion,
    /// Point circles.
    Circle,
    /// Icons and labels.
    Symbol,
    /// Map background colour.
    Background,
    /// Raster tiles.
    Raster,
}

impl LayerType {
    /// Parse the `type` string; `None` for anything outside the supported set.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "line" => Some(Self::Line),
            "fill" => Some(Self::Fill),
            "fill-extrusion" => Some(Self::FillExtrusion),
            "circle" => Some(Self::Circle),
            "symbol" => Some(Self::Symbol),
            "background" => Some(Self::Background),
            "raster" => Some(Self::Raster),
            _ => None,
        }
    }

    /// Initial draw kind. Symbol layers are refined later (points vs text).
    pub const fn draw_kind(self) -> Option<DrawKind> {
        match self {
            Self::Line => Some(DrawKind::Lines),
            Self::Fill | Self::FillExtrusion => Some(DrawKind::Polygons),
            Self::Circle => Some(DrawKind::Points),
            Self::Symbol => Some(DrawKind::Text),
            Self::Raster => Some(DrawKind::Raster),
            Self::Background => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn layout_overrides_paint() {
        let layer: SourceLayer = serde_json::from_value(json!({
            "id": "x",
            "type": "line",
            "paint": { "line-color": "#f00", "visibility": "none" },
            "layout": { "visibility": "visible", "line-cap": "round" }
        }))
        .unwrap();
        let merged = layer.merged_properties();
        let keys: Vec<&str> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, ["line-color", "visibility", "line-cap"]);
        assert_eq!(merged["visibility"], json!("visible"));
    }

    #[test]
    fn missing_layers_is_hard_error() {
        let err = StyleDocument::from_value(&json!({ "version": 8 })).unwrap_err();
        assert!(matches!(err, ConvertError::MissingLayers));
    }

    #[test]
    fn parses_text_and_looks_up_layers() {
        let doc = StyleDocument::from_json_str(
            r#"{ "layers": [ { "id": "a", "type": "fill" }, { "id": "b", "ref": "a" } ] }"#,
        )
        .unwrap();
        assert_eq!(doc.layers.len(), 2);
        assert_eq!(doc.layer("b").and_then(|l| l.reference.as_deref()), Some("a"));
        assert!(doc.layer("c").is_none());
        assert!(matches!(StyleDocument::from_json_str("{"), Err(ConvertError::Json(_))));
    }

    #[test]
    fn layer_without_id_is_rejected() {
        let err = StyleDocument::from_value(&json!({ "layers": [{ "type": "fill" }] })).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidLayer { index: 0, .. }));
    }

    #[test]
    fn type_names() {
        assert_eq!(LayerType::parse("fill-extrusion"), Some(LayerType::FillExtrusion));
        assert_eq!(LayerType::parse("heatmap"), None);
        assert_eq!(LayerType::Symbol.draw_kind(), Some(DrawKind::Text));
    }
}
