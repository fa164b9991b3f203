use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

/// Defines the requirements for authentication implementations.
///
/// Implementations are shared by every session of a server, so they must be
/// safe for concurrent use and free of side effects observable by callers.
#[async_trait]
pub trait Authenticator: Send + Sync + Debug {
    /// Authenticates the given username/password pair. `Ok(())` grants the
    /// session access; any error is reported to the client as a failed login.
    async fn authenticate(&self, username: &str, password: &str) -> Result<(), AuthenticationError>;

    /// Implement to set the name of the authenticator. By default it returns
    /// the type signature.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// The error returned by [`Authenticator::authenticate`].
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// The username/password combination was not accepted.
    #[error("bad credentials")]
    BadCredentials,

    /// The authentication backend itself failed, e.g. an upstream credential
    /// service could not be reached.
    #[error("authentication backend error: {0}")]
    ImplementationError(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}
