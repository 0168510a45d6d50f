// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Mapbox GL style → Tangram scene conversion core.
//!
//! The pipeline is a pure function from an in-memory source document to an
//! in-memory scene tree:
//!
//! ```text
//! StyleDocument ─▶ convert ─▶ walk_layer ─▶ PropertyMapper / stops / filter ─▶ Scene
//! ```
//!
//! Recoverable problems (unknown properties, unrecognized layer types or filter
//! operators) are reported through a [`DiagnosticSink`] and never abort the run.
//! Only a structurally broken document (no `layers` list) is a hard error.
//!
//! Serialization to text lives in `stylecross-yaml`; reading and writing files
//! is the caller's job.

pub mod convert;
pub mod diagnostics;
pub mod error;
pub mod filter;
pub mod fixup;
pub mod layer;
pub mod mapping;
pub mod model;
pub mod number;
pub mod scene;
pub mod stops;
pub mod transform;

pub use convert::{convert, convert_json, convert_with_sink, Conversion, ConvertOptions};
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, TracingSink};
pub use error::ConvertError;
pub use filter::{translate_filter, FilterExpr};
pub use fixup::{Dialect, OsmBrightFixup, SceneFixup};
pub use layer::{walk_layer, Blend, DrawKind, TargetStyle};
pub use model::{LayerType, PropertyBag, SourceLayer, StyleDocument};
pub use scene::{Background, DataBinding, Entries, NamedStyle, Scene, SceneSettings, TargetLayer};
pub use stops::ZoomFunction;
