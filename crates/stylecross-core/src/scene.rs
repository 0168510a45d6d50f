// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Target-side document: a Tangram scene.
//!
//! Section order is fixed (`global`, `sources`, `scene`, `lights`, `textures`,
//! `fonts`, `styles`, `layers`) and every map keeps insertion order, so the
//! emitted file follows the source layer order.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::layer::{Blend, DrawKind, TargetStyle};
use crate::model::PropertyBag;

/// Prefix of palette references written into draw blocks.
pub const PALETTE_PREFIX: &str = "global.color.";

/// `data` block binding a layer to a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataBinding {
    /// Source name.
    pub source: String,
    /// Layer inside the source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
}

/// Output-level style definition referenced by id from layer draw blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedStyle {
    /// Dash pattern.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<Value>,
    /// Draw kind the style builds on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<DrawKind>,
    /// Blend mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blend: Option<Blend>,
    /// Default draw block for layers using this style.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draw: Option<PropertyBag>,
}

impl NamedStyle {
    /// Shared translucent style with no draw defaults.
    pub const fn inlay(base: DrawKind) -> Self {
        Self {
            dash: None,
            base: Some(base),
            blend: Some(Blend::Inlay),
            draw: None,
        }
    }
}

impl From<TargetStyle> for NamedStyle {
    fn from(style: TargetStyle) -> Self {
        Self {
            dash: style.dash,
            base: style.base,
            blend: style.blend,
            draw: Some(style.draw),
        }
    }
}

/// One output layer, possibly owning sub-layers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetLayer {
    /// Data binding; `None` for sub-layers.
    pub data: Option<DataBinding>,
    /// Translated filter.
    pub filter: Option<Value>,
    /// Draw groups: draw kind or named-style id → draw block.
    pub draw: PropertyBag,
    /// Sub-layers by id, in source order.
    pub sublayers: Vec<(String, TargetLayer)>,
}

impl Serialize for TargetLayer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(data) = &self.data {
            map.serialize_entry("data", data)?;
        }
        if let Some(filter) = &self.filter {
            map.serialize_entry("filter", filter)?;
        }
        if !self.draw.is_empty() {
            map.serialize_entry("draw", &self.draw)?;
        }
        for (id, child) in &self.sublayers {
            map.serialize_entry(id, child)?;
        }
        map.end()
    }
}

/// Ordered id → value list serialized as a map.
#[derive(Debug, Clone, PartialEq)]
pub struct Entries<T>(pub Vec<(String, T)>);

impl<T> Default for Entries<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Entries<T> {
    /// Look up by id.
    pub fn get(&self, id: &str) -> Option<&T> {
        self.0.iter().find(|(k, _)| k == id).map(|(_, v)| v)
    }

    /// Mutable lookup by id.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.0.iter_mut().find(|(k, _)| k == id).map(|(_, v)| v)
    }

    /// Insert or replace, keeping the original position on replace.
    pub fn insert(&mut self, id: String, value: T) {
        match self.get_mut(&id) {
            Some(slot) => *slot = value,
            None => self.0.push((id, value)),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: Serialize> Serialize for Entries<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, value) in &self.0 {
            map.serialize_entry(id, value)?;
        }
        map.end()
    }
}

/// `scene` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SceneSettings {
    /// Map background.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
}

/// Background fill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Background {
    /// Colour value as written in the source.
    pub color: Value,
}

/// Converted scene document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scene {
    /// Global values; holds the `color` palette when global colours are enabled.
    pub global: Map<String, Value>,
    /// Known data sources (keys only; configuration is left to the caller).
    pub sources: Map<String, Value>,
    /// Scene-wide settings.
    pub scene: SceneSettings,
    /// Lights (populated by fix-ups).
    pub lights: Map<String, Value>,
    /// Textures (populated by fix-ups).
    pub textures: Map<String, Value>,
    /// Fonts (populated by fix-ups).
    pub fonts: Map<String, Value>,
    /// Named styles.
    pub styles: Entries<NamedStyle>,
    /// Top-level layers.
    pub layers: Entries<TargetLayer>,
}

impl Scene {
    /// The colour palette, if global colours are enabled.
    pub fn palette(&self) -> Option<&Map<String, Value>> {
        self.global.get("color").and_then(Value::as_object)
    }

    /// Record `value` in the palette under `key` and return the reference string.
    pub fn lift_color(&mut self, key: &str, value: Value) -> Value {
        let palette = self
            .global
            .entry("color")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(palette) = palette {
            palette.insert(key.to_owned(), value);
        }
        Value::String(format!("{PALETTE_PREFIX}{key}"))
    }

    /// Resolve a palette reference; any other value resolves to itself.
    pub fn resolve_color<'a>(&'a self, value: &'a Value) -> Option<&'a Value> {
        match value.as_str().and_then(|s| s.strip_prefix(PALETTE_PREFIX)) {
            Some(key) => self.palette().and_then(|p| p.get(key)),
            None => Some(value),
        }
    }

    /// Generic ordered tree for emitters and fix-ups.
    pub fn to_value(&self) -> Value {
        // Serialization of these types only produces maps with string keys.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sections_serialize_in_fixed_order() {
        let scene = Scene::default();
        let value = scene.to_value();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["global", "sources", "scene", "lights", "textures", "fonts", "styles", "layers"]
        );
    }

    #[test]
    fn sublayers_follow_own_fields() {
        let mut parent = TargetLayer {
            data: Some(DataBinding { source: "osm".into(), layer: Some("roads".into()) }),
            ..TargetLayer::default()
        };
        parent.draw.insert("lines".into(), json!({ "color": "red" }));
        parent.sublayers.push(("casing".into(), TargetLayer::default()));
        let value = serde_json::to_value(&parent).unwrap();
        assert_eq!(
            value,
            json!({
                "data": { "source": "osm", "layer": "roads" },
                "draw": { "lines": { "color": "red" } },
                "casing": {}
            })
        );
    }

    #[test]
    fn palette_round_trip() {
        let mut scene = Scene::default();
        let reference = scene.lift_color("water", json!("#00f"));
        assert_eq!(reference, json!("global.color.water"));
        assert_eq!(scene.resolve_color(&reference), Some(&json!("#00f")));
        assert_eq!(scene.resolve_color(&json!("#fff")), Some(&json!("#fff")));
    }

    #[test]
    fn entries_replace_in_place() {
        let mut e = Entries::default();
        e.insert("a".into(), 1);
        e.insert("b".into(), 2);
        e.insert("a".into(), 3);
        assert_eq!(e.0, vec![("a".to_owned(), 3), ("b".to_owned(), 2)]);
    }
}
