// Error taxonomy for the core modules. The UI layer wraps these in
// `anyhow::Error` and downcasts when it needs to know whether an error
// should end the session.

use std::path::PathBuf;

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("path {path:?} is not inside the library root {root:?}")]
    PathOutsideRoot { path: PathBuf, root: PathBuf },

    #[error("path {path:?} is not valid UTF-8")]
    InvalidPath { path: PathBuf },

    #[error("no assets to add")]
    EmptyAssetSet,

    #[error("album name must not be empty")]
    InvalidAlbumName,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("server unreachable: {0}")]
    RemoteUnavailable(String),

    #[error("authentication rejected by server ({status})")]
    Auth { status: StatusCode },

    #[error("server returned {status}: {body}")]
    Remote { status: StatusCode, body: String },

    #[error("unexpected response from server: {0}")]
    Decode(String),

    #[error("an album named '{name}' already exists")]
    NameConflict { name: String },

    #[error("album '{name}' was created but assets could not be added: {source}")]
    CreatedButNotFilled { name: String, source: Box<Error> },

    #[error("no assets or folders found at '{path}'")]
    EmptyPathResult { path: String },

    #[error("{} folder(s) could not be read: {}", failed.len(), failed.join(", "))]
    PartialResolution { failed: Vec<String> },
}

impl Error {
    /// Errors after which the session cannot continue.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::Auth { .. } => true,
            Error::CreatedButNotFilled { source, .. } => source.is_fatal(),
            _ => false,
        }
    }

    /// Local errors raised before any request is sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::PathOutsideRoot { .. }
                | Error::InvalidPath { .. }
                | Error::EmptyAssetSet
                | Error::InvalidAlbumName
                | Error::InvalidConfig(_)
        )
    }

    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::RemoteUnavailable(_)
                | Error::Auth { .. }
                | Error::Remote { .. }
                | Error::Decode(_)
                | Error::NameConflict { .. }
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            Error::Remote {
                status,
                body: String::new(),
            }
        } else {
            Error::RemoteUnavailable(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
