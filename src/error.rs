use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid port: {0:?} (expected 1-65535)")]
    InvalidPort(String),

    #[error("unknown setting: {0} (expected DEFAULT-USER, DEFAULT-PORT, CONFIG-FILE or SSH-KEY-DIR)")]
    UnknownSetting(String),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("settings file is corrupt: {0}")]
    Settings(#[from] bincode::Error),

    #[error("{program} failed: {message}")]
    Process { program: String, message: String },

    #[error("input error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    #[error("failed to write to the terminal: {0}")]
    Terminal(#[from] io::Error),

    #[error("unable to locate the home directory")]
    NoHomeDir,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
