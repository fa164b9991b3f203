#![deny(clippy::all)]
#![deny(missing_docs)]
#![forbid(unsafe_code)]

//! sandftp is a sandboxed, async, plain-TCP FTP server library.
//!
//! A [`Server`] listens on a control port and runs one protocol session per
//! client connection. Sessions authenticate through a plug-able
//! [`Authenticator`](crate::auth::Authenticator), keep a virtual working
//! directory and execute file-transfer commands against a sandboxed root
//! directory on local disk. Paths supplied by clients can never escape that
//! root, not even through `..` tricks or symbolic links.
//!
//! It runs on top of the Tokio asynchronous run-time and tries to make use of
//! Async IO as much as possible.
//!
//! # Quick Start
//!
//! Add the sandftp and tokio crates to your project's dependencies in Cargo.toml
//!
//! ```toml
//! [dependencies]
//! sandftp = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! Now you're ready to develop your server! Add the following to src/main.rs:
//!
//! ```no_run
//! use sandftp::auth::InMemoryAuthenticator;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! pub async fn main() {
//!     let users = InMemoryAuthenticator::new();
//!     users.add_user("alice", "correct-horse");
//!
//!     let server = sandftp::Server::with_root(std::env::temp_dir())
//!         .greeting("Welcome to my FTP server")
//!         .authenticator(Arc::new(users))
//!         .passive_ports(50000..=65535)
//!         .build()
//!         .unwrap();
//!
//!     server.listen("127.0.0.1:2121").await.unwrap();
//! }
//! ```
//!
//! You can now run your server with cargo run and connect to localhost:2121
//! with your favourite FTP client.

pub mod auth;
pub(crate) mod fs;
pub(crate) mod server;

pub use crate::server::ftpserver::{Server, ServerBuilder, error::ServerError};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
