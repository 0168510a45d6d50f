// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Hard failures: the source document cannot be converted at all.

use thiserror::Error;

/// Error type for caller-input problems that leave no meaningful partial output.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The document has no top-level `layers` list.
    #[error("style document has no `layers` list")]
    MissingLayers,
    /// A `layers` entry could not be read as a layer.
    #[error("layer #{index} is invalid: {reason}")]
    InvalidLayer {
        /// Position of the offending entry in `layers`.
        index: usize,
        /// Why it was rejected.
        reason: String,
    },
    /// The input was not valid JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
