//! Typed errors surfaced through `anyhow::Error`; callers `downcast_ref` to branch on them.

use core::error::Error;
use core::fmt::{Display, Formatter, Result as FmtResult};
use css::SyntaxError;

/// Errors raised by the editor core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorError {
    /// Malformed init options; fatal for `init`.
    Configuration(String),
    /// Malformed seed markup or CSS; fatal for the import call that hit it.
    Parse(SyntaxError),
    /// A command id with no registered definition.
    UnknownCommand(String),
    /// A storage backend failed; the in-memory model is unchanged.
    Storage(String),
}

impl Display for EditorError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Configuration(message) => write!(formatter, "ConfigurationError: {message}"),
            Self::Parse(error) => write!(formatter, "ParseError: {error}"),
            Self::UnknownCommand(id) => write!(formatter, "UnknownCommand: '{id}' is not defined"),
            Self::Storage(message) => write!(formatter, "StorageError: {message}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(error) => Some(error),
            Self::Configuration(_) | Self::UnknownCommand(_) | Self::Storage(_) => None,
        }
    }
}

impl From<SyntaxError> for EditorError {
    fn from(error: SyntaxError) -> Self {
        Self::Parse(error)
    }
}
