// Error type for the music layer.
//
// Wraps the chain engine's errors and adds parameter-file failures. The
// `generate` binary reports these through `anyhow`.

use crate::tune::Cadence;
use std::path::PathBuf;
use tunegen_chain::{ChainError, TimelineError};

#[derive(Debug, thiserror::Error)]
pub enum MusicError {
    /// A generator's probability table or anchors were rejected by the
    /// chain engine.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// A layer was looked up at a time before its first event, e.g. notes
    /// generated without a chord layer.
    #[error(transparent)]
    Timeline(#[from] TimelineError),

    /// A parameter value is out of range or inconsistent.
    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    /// The chord root table has no row for a cadence that occurs in the
    /// progression.
    #[error("no chord root weights for cadence {cadence:?}")]
    MissingCadence { cadence: Cadence },

    #[error("failed to parse parameters: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl MusicError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        MusicError::InvalidParameter {
            reason: reason.into(),
        }
    }
}
