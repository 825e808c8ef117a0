//! Errors raised while loading or saving `config.ron`.

use std::path::PathBuf;

use parallax_starfield::FieldError;

/// A config file operation failed. Every variant names the file involved.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", .path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid RON: {source}", .path.display())]
    ParseError {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("cannot serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    /// The file parsed but describes a starfield the engine rejects.
    #[error("{} has invalid starfield settings: {source}", .path.display())]
    InvalidStarfield {
        path: PathBuf,
        #[source]
        source: FieldError,
    },
}
