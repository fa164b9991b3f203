//! Contains the error type produced when building or running a
//! [`Server`](crate::Server).

use thiserror::Error;

/// Fatal server errors: everything per-session is handled inside the session
/// and never surfaces here.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The control address could not be bound.
    #[error("failed to bind to the control address: {0}")]
    Bind(#[source] std::io::Error),

    /// The sandbox root does not exist, is not a directory, or could not be
    /// opened.
    #[error("invalid sandbox root: {0}")]
    Root(#[source] std::io::Error),
}
