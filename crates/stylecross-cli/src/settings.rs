// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Effective preferences: flags > `--config` file > stored prefs > defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde_json::Value;
use stylecross_app_core::config::{ConfigService, ConfigStore};
use stylecross_app_core::prefs::{ConvertPrefs, PREFS_KEY};
use stylecross_core::Dialect;
use stylecross_yaml::EmitOptions;

/// Output layout presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Scene-file layout (flow from depth 8, blank lines between sections).
    Scene,
    /// Plain block YAML.
    Plain,
}

/// Flags that override stored preferences.
#[derive(Args, Debug, Default)]
pub struct PrefsArgs {
    /// Lift literal colours into `global.color`.
    #[arg(long)]
    global_colors: bool,
    /// Data source for layers without a `source`.
    #[arg(long, value_name = "NAME")]
    default_source: Option<String>,
    /// Source-style fix-ups (`none`, `osm-bright`).
    #[arg(long)]
    dialect: Option<Dialect>,
    /// Start the output layout from a preset; other layout flags apply on top.
    #[arg(long, value_enum)]
    preset: Option<Preset>,
    /// Depth at which output switches to flow style.
    #[arg(long, value_name = "DEPTH")]
    flow_level: Option<usize>,
    /// Keys always written in flow style (comma-separated or repeated).
    #[arg(long, value_name = "KEY", value_delimiter = ',')]
    always_flow: Vec<String>,
    /// Extra blank lines between top-level blocks.
    #[arg(long, value_name = "N")]
    extra_lines: Option<usize>,
    /// Indentation string.
    #[arg(long, value_name = "TEXT")]
    indent: Option<String>,
    /// Quote character for non-bare strings.
    #[arg(long, value_name = "CHAR")]
    quote: Option<char>,
}

impl PrefsArgs {
    fn apply(&self, prefs: &mut ConvertPrefs) {
        if self.global_colors {
            prefs.convert.global_colors = true;
        }
        if let Some(source) = &self.default_source {
            prefs.convert.default_source.clone_from(source);
        }
        if let Some(dialect) = self.dialect {
            prefs.dialect = dialect;
        }
        match self.preset {
            Some(Preset::Scene) => prefs.emit = EmitOptions::scene_preset(),
            Some(Preset::Plain) => prefs.emit = EmitOptions::default(),
            None => {}
        }
        if let Some(level) = self.flow_level {
            prefs.emit.flow_level = level;
        }
        if !self.always_flow.is_empty() {
            prefs.emit.always_flow.clone_from(&self.always_flow);
        }
        if let Some(lines) = self.extra_lines {
            prefs.emit.extra_lines = lines;
        }
        if let Some(indent) = &self.indent {
            prefs.emit.indent.clone_from(indent);
        }
        if let Some(quote) = self.quote {
            prefs.emit.quote = quote;
        }
    }
}

/// Recursively overlay `top` onto `base`; maps merge, everything else replaces.
fn overlay(base: &mut Value, top: Value) {
    match (base, top) {
        (Value::Object(base), Value::Object(top)) => {
            for (key, value) in top {
                match base.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, top) => *slot = top,
    }
}

/// Build the preferences a command runs with.
pub fn resolve<S: ConfigStore>(
    service: &ConfigService<S>,
    config_file: Option<&Path>,
    flags: &PrefsArgs,
) -> Result<ConvertPrefs> {
    let stored = service
        .load::<Value>(PREFS_KEY)
        .context("load stored preferences")?;
    let mut layered = serde_json::to_value(ConvertPrefs::default()).context("default preferences")?;
    if let Some(stored) = stored {
        overlay(&mut layered, stored);
    }
    if let Some(path) = config_file {
        let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let file: Value =
            serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
        overlay(&mut layered, file);
    }
    let mut prefs: ConvertPrefs =
        serde_json::from_value(layered).context("invalid preferences")?;
    flags.apply(&mut prefs);
    Ok(prefs)
}
