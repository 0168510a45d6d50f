// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Convert → fix up → render, as one call.

use serde_json::Value;
use stylecross_core::{convert_json, ConvertError, Diagnostic};

use crate::prefs::ConvertPrefs;

/// Text format of the rendered scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Block/flow YAML laid out by the emit preferences.
    #[default]
    Yaml,
    /// Pretty-printed JSON (emit preferences are ignored).
    Json,
}

/// Rendered scene text plus the diagnostics gathered while converting.
#[derive(Debug, Clone)]
pub struct Rendered {
    /// Scene document, without a trailing newline.
    pub text: String,
    /// Recoverable problems, in the order encountered.
    pub diagnostics: Vec<Diagnostic>,
}

/// Convert a parsed style document and render it.
pub fn render(style: &Value, prefs: &ConvertPrefs, format: OutputFormat) -> Result<Rendered, ConvertError> {
    let conversion = convert_json(style, &prefs.convert)?;
    let mut tree = conversion.scene.to_value();
    if let Some(fixup) = prefs.dialect.fixup() {
        fixup.apply(&mut tree);
    }
    let text = match format {
        OutputFormat::Yaml => stylecross_yaml::to_string(&tree, &prefs.emit),
        OutputFormat::Json => serde_json::to_string_pretty(&tree)?,
    };
    Ok(Rendered {
        text,
        diagnostics: conversion.diagnostics,
    })
}
