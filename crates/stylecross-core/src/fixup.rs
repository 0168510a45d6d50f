// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Dialect fix-ups applied to a converted scene tree.
//!
//! The converter produces a generic scene. A fix-up adapts it to one particular
//! source style: swapping in global helpers, attaching textures and fonts, and
//! adding things the source style cannot express.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Post-processing pass over the generic scene tree.
pub trait SceneFixup {
    /// Rewrite `scene` in place.
    fn apply(&self, scene: &mut Value);
}

/// Known source-style dialects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    /// Generic output, no fix-ups.
    #[default]
    None,
    /// OpenMapTiles "OSM Bright".
    OsmBright,
}

impl Dialect {
    /// All dialects, for help output.
    pub const ALL: [Self; 2] = [Self::None, Self::OsmBright];

    /// CLI / config name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::OsmBright => "osm-bright",
        }
    }

    /// Fix-up for this dialect, if any.
    pub fn fixup(self) -> Option<Box<dyn SceneFixup>> {
        match self {
            Self::None => None,
            Self::OsmBright => Some(Box::new(OsmBrightFixup::default())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| format!("unknown dialect `{s}` (expected none or osm-bright)"))
    }
}

/// Fix-up for the OpenMapTiles OSM Bright style.
#[derive(Debug, Clone)]
pub struct OsmBrightFixup {
    /// Texture holding the sprite sheet.
    pub texture: String,
    /// URL of the sprite sheet.
    pub texture_url: String,
    /// Font family the `Noto Sans*` stacks collapse to.
    pub font_family: String,
}

impl Default for OsmBrightFixup {
    fn default() -> Self {
        Self {
            texture: "osm-bright".to_owned(),
            texture_url: "img/osm-bright.svg".to_owned(),
            font_family: "Noto Sans".to_owned(),
        }
    }
}

const LATIN_NAME: &str =
    "function() { return feature['name:latin'] || feature.name_en || feature.name; }";
const NAMES_TWO_LINES: &str = "function() { const nl = feature['name:nonlatin']; \
     return global.latin_name() + (nl ? '\\n' + nl : ''); }";
const NAMES_ONE_LINE: &str = "function() { const nl = feature['name:nonlatin']; \
     return global.latin_name() + (nl ? ' ' + nl : ''); }";

impl OsmBrightFixup {
    fn walk(&self, node: &mut Value) {
        match node {
            Value::Object(map) => {
                let keys: Vec<String> = map.keys().cloned().collect();
                for key in keys {
                    self.visit(map, &key);
                    if let Some(child) = map.get_mut(&key) {
                        self.walk(child);
                    }
                }
            }
            Value::Array(items) => items.iter_mut().for_each(|item| self.walk(item)),
            _ => {}
        }
    }

    fn visit(&self, map: &mut Map<String, Value>, key: &str) {
        if key.starts_with("landuse-") || key.starts_with("landcover-") {
            if let Some(layer) = map.get_mut(key) {
                if layer.pointer("/draw/polygons").is_some() {
                    layer["enabled"] = json!("global.show_polygons");
                    layer["draw"]["polygons"]["style"] = json!("global.earth_style");
                }
            }
        } else if key.starts_with("poi-level-") {
            if let Some(points) = map.get_mut(key).and_then(|l| l.pointer_mut("/draw/points")) {
                if points.get("text").is_some() {
                    points["interactive"] = json!(true);
                    points["text"]["interactive"] = json!(true);
                }
            }
        } else if key == "text_source" {
            let replacement = match map.get(key).and_then(Value::as_str) {
                Some("name:latin") => Some("global.latin_name"),
                Some("name:latin\nname:nonlatin") => Some("global.names_two_lines"),
                Some("name:latin name:nonlatin") => Some("global.names_one_line"),
                _ => None,
            };
            if let Some(replacement) = replacement {
                map.insert(key.to_owned(), json!(replacement));
            }
        } else if key == "family" {
            let first = match map.get(key) {
                Some(Value::Array(items)) => items.first().and_then(Value::as_str).map(str::to_owned),
                Some(Value::String(s)) => Some(s.clone()),
                _ => None,
            };
            if let Some(first) = first {
                if first.ends_with("Italic") {
                    map.insert("style".to_owned(), json!("italic"));
                }
                if first.ends_with("Bold") {
                    map.insert("weight".to_owned(), json!("bold"));
                }
                if first.starts_with(&self.font_family) {
                    map.insert(key.to_owned(), json!("global.font_sans"));
                }
            }
        } else if key == "sprite" {
            map.insert("texture".to_owned(), json!(self.texture));
            if let Some(function) = map.get(key).and_then(Value::as_str).and_then(sprite_function) {
                map.insert(key.to_owned(), Value::String(function));
            }
        }
    }

    fn add_resources(&self, scene: &mut Map<String, Value>) {
        scene.insert(
            "lights".to_owned(),
            json!({ "light1": {
                "type": "directional", "origin": "world", "direction": [1, 1, -1],
                "diffuse": 0.5, "ambient": 0.7
            }}),
        );
        scene.insert(
            "textures".to_owned(),
            json!({ self.texture.clone(): { "url": self.texture_url, "density": 2 } }),
        );
        scene.insert(
            "fonts".to_owned(),
            json!({ self.font_family.clone(): [
                { "url": "fonts/NotoSans-Regular.ttf" },
                { "style": "italic", "url": "fonts/NotoSans-Italic.ttf" },
                { "weight": 600, "url": "fonts/NotoSans-SemiBold.ttf" }
            ]}),
        );

        // extruded buildings from z15, as a sub-layer of the flat building layer
        if let Some(Value::Object(building)) =
            scene.get_mut("layers").and_then(|l| l.get_mut("building"))
        {
            building.insert(
                "extrusion".to_owned(),
                json!({
                    "filter": { "$zoom": { "min": 15 } },
                    "draw": { "polygons": { "extrude": ["render_min_height", "render_height"] } }
                }),
            );
        }

        let global = scene
            .entry("global")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(global) = global {
            global.insert("earth_style".to_owned(), json!("polygons"));
            global.insert("elevation_sources".to_owned(), json!([]));
            global.insert("show_polygons".to_owned(), json!("true"));
            global.insert("font_sans".to_owned(), json!(self.font_family));
            global.insert("latin_name".to_owned(), json!(LATIN_NAME));
            global.insert("names_two_lines".to_owned(), json!(NAMES_TWO_LINES));
            global.insert("names_one_line".to_owned(), json!(NAMES_ONE_LINE));
        }
    }
}

/// `"{class}_11"` → a JS function building the sprite name from feature properties.
///
/// `None` when the name has no `{field}` placeholder.
fn sprite_function(sprite: &str) -> Option<String> {
    let mut body = String::new();
    let mut rest = sprite;
    let mut templated = false;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let field_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        if field_len > 0 && after[field_len..].starts_with('}') {
            body.push_str(&rest[..open]);
            body.push_str("' + feature.");
            body.push_str(&after[..field_len]);
            body.push_str(" + '");
            rest = &after[field_len + 1..];
            templated = true;
        } else {
            body.push_str(&rest[..=open]);
            rest = after;
        }
    }
    body.push_str(rest);
    templated.then(|| format!("function() {{ return '{body}'; }}"))
}

impl SceneFixup for OsmBrightFixup {
    fn apply(&self, scene: &mut Value) {
        self.walk(scene);
        if let Value::Object(root) = scene {
            self.add_resources(root);
        }
        tracing::debug!("applied osm-bright fix-ups");
    }
}
