// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Diagnostics channel for recoverable conversion problems.
//!
//! Nothing reported here aborts a conversion. Callers pick a sink: collect into a
//! `Vec<Diagnostic>`, forward to `tracing`, or both via [`TracingSink`].

use std::fmt;

/// Category of a recoverable problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Source properties no mapping table recognized.
    UnhandledProperties,
    /// Layer `type` outside the supported set (or missing).
    UnknownLayerType,
    /// Filter operator the translator does not know.
    UnknownFilterOperator,
    /// Text properties on a layer that is not a symbol layer.
    IgnoredTextProperties,
    /// `ref` names a layer that does not exist or produced no output.
    MissingParentLayer,
    /// Background layer without a `background-color`.
    MissingBackgroundColor,
}

impl DiagnosticKind {
    /// Stable short tag, handy for grouping in logs.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::UnhandledProperties => "unhandled-properties",
            Self::UnknownLayerType => "unknown-layer-type",
            Self::UnknownFilterOperator => "unknown-filter-operator",
            Self::IgnoredTextProperties => "ignored-text-properties",
            Self::MissingParentLayer => "missing-parent-layer",
            Self::MissingBackgroundColor => "missing-background-color",
        }
    }
}

/// One `(layer, message)` report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Layer id the problem belongs to, when known.
    pub layer: Option<String>,
    /// Category.
    pub kind: DiagnosticKind,
    /// Human-readable detail.
    pub message: String,
}

impl Diagnostic {
    /// Build a diagnostic scoped to `layer`.
    pub fn new(layer: &str, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            layer: Some(layer.to_owned()),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.layer {
            Some(layer) => write!(f, "[{layer}] {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Receiver of diagnostics produced during one conversion run.
pub trait DiagnosticSink {
    /// Accept one diagnostic.
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}

/// Logs each diagnostic through `tracing`, then forwards it to `inner`.
#[derive(Debug, Default)]
pub struct TracingSink<S> {
    inner: S,
}

impl<S> TracingSink<S> {
    /// Wrap a sink.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Unwrap the inner sink.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: DiagnosticSink> DiagnosticSink for TracingSink<S> {
    fn report(&mut self, diagnostic: Diagnostic) {
        let layer = diagnostic.layer.as_deref().unwrap_or("-");
        match diagnostic.kind {
            DiagnosticKind::UnknownLayerType => {
                tracing::error!(layer, kind = diagnostic.kind.tag(), "{}", diagnostic.message);
            }
            _ => tracing::warn!(layer, kind = diagnostic.kind.tag(), "{}", diagnostic.message),
        }
        self.inner.report(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_layer() {
        let d = Diagnostic::new("water", DiagnosticKind::UnhandledProperties, "x");
        assert_eq!(d.to_string(), "[water] x");
    }

    #[test]
    fn tracing_sink_forwards() {
        let mut sink = TracingSink::new(Vec::new());
        sink.report(Diagnostic::new("a", DiagnosticKind::UnknownLayerType, "bad"));
        let collected = sink.into_inner();
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].kind, DiagnosticKind::UnknownLayerType);
    }
}
