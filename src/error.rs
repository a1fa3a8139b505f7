//! Error and advisory types for inquiry-matcher.
//!
//! Library operations return [`Error`]; the CLI boundary absorbs it into
//! `anyhow` the usual way. [`Advisory`] is deliberately *not* an error: it is
//! a non-blocking notice (merge-on-create, "already in progress") that must
//! never travel through the error channel.

use std::fmt;

use thiserror::Error;

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure kinds for the submit/poll/registry workflow.
#[derive(Error, Debug)]
pub enum Error {
    /// Submission blocked locally by the validator; no network call was made.
    #[error("{0}")]
    Validation(String),

    /// Non-2xx response or transport failure. The message carries the
    /// backend's `error` field when present, otherwise "Server error".
    #[error("{0}")]
    Network(String),

    /// The compare response carried neither matches nor a job identifier.
    #[error("unexpected response from server: neither matches nor a request id")]
    UnexpectedResponseShape,

    /// The poll budget ran out before the job produced a terminal payload.
    #[error("no result after {attempts} status checks; the job may still be running")]
    PollTimeout { attempts: u32 },

    /// Polling was cancelled before completion.
    #[error("cancelled while waiting for results")]
    Cancelled,

    /// A session method was invoked in a state that does not permit it.
    #[error("invalid session transition: {from} -> {attempted}")]
    State {
        from: &'static str,
        attempted: &'static str,
    },
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

/// A non-blocking, user-visible notice that does not represent a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// A create-dataset call named an existing dataset; the backend appended
    /// the new items to it instead of erroring.
    MergedIntoExisting { name: String },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::MergedIntoExisting { name } => write!(
                f,
                "dataset '{}' already exists; the new items were appended to it",
                name
            ),
        }
    }
}
