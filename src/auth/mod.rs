//! Contains the [`Authenticator`] trait that sandftp uses to authenticate
//! users, along with a ready-made concurrent in-memory implementation.
//!
//! You can define your own implementation to integrate the server with
//! whatever credential store you need. For example, to define an
//! `Authenticator` that will randomly decide:
//!
//! ```rust
//! use sandftp::auth::{AuthenticationError, Authenticator};
//! use async_trait::async_trait;
//!
//! #[derive(Debug)]
//! struct RandomAuthenticator;
//!
//! #[async_trait]
//! impl Authenticator for RandomAuthenticator {
//!     async fn authenticate(&self, _username: &str, _password: &str) -> Result<(), AuthenticationError> {
//!         Ok(())
//!     }
//! }
//! ```

mod authenticator;
pub use authenticator::{AuthenticationError, Authenticator};

mod in_memory;
pub use in_memory::InMemoryAuthenticator;
