//! Sandboxed local-filesystem access: virtual path resolution, dir-relative
//! file operations and the directory listing formatter.
//!
//! The sandbox root is opened once as a [`cap_std::fs::Dir`] and every host
//! I/O a command handler performs goes through that handle with a
//! root-relative path from the [`PathResolver`]. Escapes fail at the
//! operation itself, so there is no window between a containment check and
//! the actual open for a concurrent session to slip a symlink into.

pub(crate) mod cap_fs;

mod error;
pub(crate) use error::{Error, ErrorKind};

mod resolver;
pub(crate) use resolver::PathResolver;
pub(crate) use resolver::normalize_virtual;

pub(crate) mod listing;
