//! A capabilities-friendly workalike of the tokio::fs functions the command
//! handlers need.
//
// cap_std operations are blocking, so each one hops onto tokio's blocking
// pool, the same way tokio::fs wraps std::fs.

use cap_std::fs::{Dir, File, Metadata, OpenOptions};
use std::{io, path::Path, sync::Arc};
use tokio::task::spawn_blocking;

// Runs one blocking filesystem closure on the blocking pool.
pub(super) async fn asyncify<F, T>(f: F) -> io::Result<T>
where
    F: FnOnce() -> io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    match spawn_blocking(f).await {
        Ok(res) => res,
        Err(_) => Err(io::Error::other("background task failed")),
    }
}

/// Queries metadata for a path under this directory, following symlinks.
pub(crate) async fn metadata<P: AsRef<Path>>(root: Arc<Dir>, path: P) -> io::Result<Metadata> {
    let path = path.as_ref().to_owned();
    asyncify(move || root.metadata(path)).await
}

/// Opens a file under this directory for reading.
pub(crate) async fn open<P: AsRef<Path>>(root: Arc<Dir>, path: P) -> io::Result<File> {
    let path = path.as_ref().to_owned();
    asyncify(move || root.open(path)).await
}

/// Opens a file under this directory with the given options.
pub(crate) async fn open_with<P: AsRef<Path>>(root: Arc<Dir>, path: P, options: OpenOptions) -> io::Result<File> {
    let path = path.as_ref().to_owned();
    asyncify(move || root.open_with(path, &options)).await
}

/// Creates a new directory somewhere under this one.
pub(crate) async fn create_dir<P: AsRef<Path>>(root: Arc<Dir>, path: P) -> io::Result<()> {
    let path = path.as_ref().to_owned();
    asyncify(move || root.create_dir(path)).await
}

/// Removes a file somewhere under this directory.
pub(crate) async fn remove_file<P: AsRef<Path>>(root: Arc<Dir>, path: P) -> io::Result<()> {
    let path = path.as_ref().to_owned();
    asyncify(move || root.remove_file(path)).await
}

/// Removes a directory under this one, contents included.
pub(crate) async fn remove_dir_all<P: AsRef<Path>>(root: Arc<Dir>, path: P) -> io::Result<()> {
    let path = path.as_ref().to_owned();
    asyncify(move || root.remove_dir_all(path)).await
}

/// Renames a file or directory, both names interpreted under this directory.
pub(crate) async fn rename<P: AsRef<Path>, Q: AsRef<Path>>(root: Arc<Dir>, from: P, to: Q) -> io::Result<()> {
    let from = from.as_ref().to_owned();
    let to = to.as_ref().to_owned();
    asyncify(move || root.rename(from, &root, to)).await
}
