use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the core library.
///
/// Tick processing itself never fails; these cover the edges that touch the
/// filesystem (dump replay, snapshot persistence, settings).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("io error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode snapshot: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("settings error: {0}")]
    Config(#[from] confy::ConfyError),
}

impl CoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
