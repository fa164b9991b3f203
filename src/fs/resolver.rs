//! Maps virtual FTP paths to sandbox-relative host paths.

use super::error::{Error, ErrorKind};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolves client supplied paths against the sandbox root.
///
/// The root directory is opened once here and kept as a capability handle;
/// every filesystem operation runs relative to that handle through
/// [`super::cap_fs`]. Resolution of each path component then happens inside
/// the operation itself, against the already-open directory, so a symlink
/// swapped in by a concurrent session cannot redirect an operation outside
/// the root: the operation fails instead.
#[derive(Debug, Clone)]
pub(crate) struct PathResolver {
    root: PathBuf,
    root_fd: Arc<Dir>,
}

impl PathResolver {
    /// Opens the given root directory. The path is canonicalized once for
    /// display purposes; enforcement rests on the handle, not the string.
    pub fn new<P: Into<PathBuf>>(root: P) -> std::io::Result<PathResolver> {
        let root = std::fs::canonicalize(root.into())?;
        let root_fd = Dir::open_ambient_dir(&root, ambient_authority())?;
        Ok(PathResolver {
            root,
            root_fd: Arc::new(root_fd),
        })
    }

    /// Where the sandbox root lives, for logging.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The open handle to the sandbox root that all operations go through.
    pub fn dir(&self) -> Arc<Dir> {
        self.root_fd.clone()
    }

    /// Combines the virtual working directory and a client argument into a
    /// path relative to the root handle.
    ///
    /// This is purely textual: empty and `.` segments drop out, and an
    /// argument whose `..` segments climb higher than the root is rejected
    /// right here. Remaining `..` segments and any symlinks are left for the
    /// root handle to walk when the operation runs, which keeps resolution
    /// and use in one step.
    pub fn relative(&self, cwd: &str, arg: &str) -> Result<PathBuf, Error> {
        let segments: Box<dyn Iterator<Item = &str> + '_> = if arg.starts_with('/') {
            Box::new(arg.split('/'))
        } else {
            Box::new(cwd.split('/').chain(arg.split('/')))
        };
        let mut relative = PathBuf::new();
        let mut depth: i32 = 0;
        for segment in segments {
            match segment {
                "" | "." => {}
                ".." => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(ErrorKind::SandboxViolation.into());
                    }
                    relative.push("..");
                }
                other => {
                    depth += 1;
                    relative.push(other);
                }
            }
        }
        if relative.as_os_str().is_empty() {
            relative.push(".");
        }
        Ok(relative)
    }
}

/// Normalizes a virtual path change textually: collapses duplicate slashes,
/// drops `.` segments and lets `..` pop one level without ever climbing past
/// the root. The result has no trailing slash except for `/` itself.
pub(crate) fn normalize_virtual(cwd: &str, arg: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if !arg.starts_with('/') {
        parts.extend(cwd.split('/').filter(|s| !s.is_empty()));
    }
    for segment in arg.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::cap_fs;
    use pretty_assertions::assert_eq;

    fn sandbox() -> (tempfile::TempDir, PathResolver) {
        let dir = tempfile::TempDir::new().unwrap();
        let resolver = PathResolver::new(dir.path()).unwrap();
        (dir, resolver)
    }

    #[test]
    fn normalize_absolute_replaces_cwd() {
        assert_eq!(normalize_virtual("/foo/bar", "/baz"), "/baz");
    }

    #[test]
    fn normalize_relative_appends() {
        assert_eq!(normalize_virtual("/foo", "bar/baz"), "/foo/bar/baz");
    }

    #[test]
    fn normalize_dotdot_pops() {
        assert_eq!(normalize_virtual("/foo/bar", ".."), "/foo");
        assert_eq!(normalize_virtual("/foo/bar", "../.."), "/");
    }

    #[test]
    fn normalize_dotdot_stops_at_root() {
        assert_eq!(normalize_virtual("/", "../../.."), "/");
        assert_eq!(normalize_virtual("/a", "../../b"), "/b");
    }

    #[test]
    fn normalize_collapses_slashes_and_dots() {
        assert_eq!(normalize_virtual("/", "a//b/./c/"), "/a/b/c");
    }

    #[test]
    fn relative_absolute_replaces_cwd() {
        let (_dir, resolver) = sandbox();
        assert_eq!(resolver.relative("/foo/bar", "/baz").unwrap(), PathBuf::from("baz"));
    }

    #[test]
    fn relative_appends_to_cwd() {
        let (_dir, resolver) = sandbox();
        assert_eq!(resolver.relative("/foo", "bar/baz").unwrap(), PathBuf::from("foo/bar/baz"));
    }

    #[test]
    fn relative_root_becomes_dot() {
        let (_dir, resolver) = sandbox();
        assert_eq!(resolver.relative("/", "/").unwrap(), PathBuf::from("."));
        assert_eq!(resolver.relative("/", ".").unwrap(), PathBuf::from("."));
    }

    #[test]
    fn relative_keeps_balanced_dotdot() {
        let (_dir, resolver) = sandbox();
        assert_eq!(resolver.relative("/", "a/../b").unwrap(), PathBuf::from("a/../b"));
    }

    #[test]
    fn relative_rejects_climbing_out() {
        let (_dir, resolver) = sandbox();
        let err = resolver.relative("/", "..").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SandboxViolation);
        let err = resolver.relative("/a", "../../b").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SandboxViolation);
        let err = resolver.relative("/", "/../etc").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SandboxViolation);
    }

    #[tokio::test]
    async fn operations_resolve_under_the_root() {
        let (dir, resolver) = sandbox();
        std::fs::write(dir.path().join("hello.txt"), b"hi").unwrap();
        let rel = resolver.relative("/", "hello.txt").unwrap();
        let meta = cap_fs::metadata(resolver.dir(), &rel).await.unwrap();
        assert_eq!(meta.len(), 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn operations_refuse_symlink_escapes() {
        let (dir, resolver) = sandbox();
        let outside = tempfile::TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("sneaky")).unwrap();
        let rel = resolver.relative("/", "sneaky").unwrap();
        // The handle refuses to follow the link out of the sandbox at
        // operation time, which is the moment that matters.
        assert!(cap_fs::metadata(resolver.dir(), &rel).await.is_err());
    }
}
