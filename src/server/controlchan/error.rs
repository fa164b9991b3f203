//! Contains the `ControlChanError` struct that defines the control channel
//! error type.

use crate::BoxError;
use derive_more::Display;
use thiserror::Error;

/// Errors that terminate the control channel loop or surface from its I/O.
/// Per-command failures are not errors in this sense; handlers turn those
/// into replies.
#[derive(Debug, Error)]
#[error("control channel error: {kind}")]
pub(crate) struct ControlChanError {
    kind: ControlChanErrorKind,
    #[source]
    source: Option<BoxError>,
}

/// A list specifying categories of control channel failures.
#[derive(Eq, PartialEq, Debug, Display, Clone, Copy)]
pub(crate) enum ControlChanErrorKind {
    /// We encountered a system IO error.
    #[display("failed to perform IO on the control channel")]
    IoError,
}

impl ControlChanError {
    /// Return the inner error kind of this error.
    #[allow(unused)]
    pub fn kind(&self) -> ControlChanErrorKind {
        self.kind
    }
}

impl From<std::io::Error> for ControlChanError {
    fn from(err: std::io::Error) -> ControlChanError {
        ControlChanError {
            kind: ControlChanErrorKind::IoError,
            source: Some(Box::new(err)),
        }
    }
}
