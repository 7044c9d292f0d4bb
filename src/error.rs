//! Error types shared by every layer below the application.
//!
//! Lookup failures for auth presets get their own variant so callers can tell
//! "preset missing" apart from "preset found but incomplete", which surfaces
//! as `Validation`.

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Malformed command-line input.
    Parse(String),

    /// Input that parsed but is not acceptable (bad method, missing auth
    /// field, invalid header, unknown environment...).
    Validation(String),

    /// A `${NAME}` placeholder with no value.
    MissingEnvVar(String),

    /// Every `{name}` placeholder left without a value.
    MissingVariables(Vec<String>),

    InvalidUrl { url: String, reason: String },

    /// Connect, DNS, timeout or body read failure.
    Transport(reqwest::Error),

    /// Filesystem or record failure in one of the stores.
    Storage {
        op: &'static str,
        key: String,
        reason: String,
    },

    AuthNotFound(String),
}

impl Error {
    pub(crate) fn storage(op: &'static str, key: impl Into<String>, reason: impl fmt::Display) -> Self {
        Error::Storage {
            op,
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(msg) => write!(f, "{msg}"),
            Error::Validation(msg) => write!(f, "{msg}"),
            Error::MissingEnvVar(name) => {
                write!(f, "environment variable not found: {name}")
            }
            Error::MissingVariables(names) => {
                write!(f, "missing template variables: [{}]", names.join(", "))
            }
            Error::InvalidUrl { url, reason } => write!(f, "invalid URL '{url}': {reason}"),
            Error::Transport(e) => {
                if e.is_timeout() {
                    write!(f, "request timed out: {e}")
                } else if e.is_connect() {
                    write!(f, "connection failed: {e}")
                } else {
                    write!(f, "request failed: {e}")
                }
            }
            Error::Storage { op, key, reason } => write!(f, "failed to {op} '{key}': {reason}"),
            Error::AuthNotFound(name) => write!(f, "auth preset not found: {name}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(e)
    }
}
