//! Crate-level error type.

use crate::parser::{ParseError, UsageError};
use crate::registry::RegistryError;
use thiserror::Error;

/// Who is responsible for an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The command line given by the user is wrong. Report and exit.
    UserInput,
    /// The host program misused the API. This is a bug in the host.
    Programmer,
}

/// Any error produced while declaring, parsing or reading parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Usage(#[from] UsageError),
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Parse(_) => ErrorCategory::UserInput,
            Error::Registry(_) | Error::Usage(_) => ErrorCategory::Programmer,
        }
    }

    /// The user-input error, if this is one.
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match self {
            Error::Parse(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
