use crate::BoxError;
use derive_more::Display;
use thiserror::Error;

/// The error produced by sandboxed filesystem operations. The `ErrorKind`
/// determines the reply code the FTP client ends up seeing, so pick variants
/// carefully.
#[derive(Debug, Error)]
#[error("filesystem error: {kind}")]
pub(crate) struct Error {
    kind: ErrorKind,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    /// Creates a new filesystem error wrapping an underlying cause.
    pub fn new<E>(kind: ErrorKind, error: E) -> Error
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error {
            kind,
            source: Some(error.into()),
        }
    }

    /// What failure class this is, which in turn tells the control channel
    /// what to reply.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { kind, source: None }
    }
}

/// Failure classes for sandboxed filesystem operations.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub(crate) enum ErrorKind {
    /// The file or directory does not exist. Reply code 550.
    #[display("File or directory not found")]
    NotFound,
    /// The operation conflicts with an existing entry, e.g. `MKD` on an
    /// existing name. Reply code 550.
    #[display("Already exists")]
    Conflict,
    /// The resolved host path escapes the sandbox root. Reply code 550, never
    /// 530: a re-auth loop on the client side would only confuse matters.
    #[display("Path is outside the storage root")]
    SandboxViolation,
    /// The OS denied access. Reply code 550.
    #[display("Permission denied")]
    PermissionDenied,
    /// A regular file was expected, e.g. for `SIZE` or `RETR`. Reply code 550.
    #[display("Not a regular file")]
    NotAFile,
    /// A directory was expected, e.g. for `CWD`. Reply code 550.
    #[display("Not a directory")]
    NotADirectory,
    /// The peer closed the data connection mid-transfer. Reply code 550.
    #[display("Data connection closed")]
    ConnectionClosed,
    /// I/O failed while bytes were moving between file and data channel.
    /// Reply code 550.
    #[display("Transfer failed")]
    TransferFailed,
    /// Anything else that went wrong locally. Reply code 550.
    #[display("Local error")]
    LocalError,
}

// Maps OS errors to failure classes. Everything we cannot classify is a
// LocalError.
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            std::io::ErrorKind::AlreadyExists => ErrorKind::Conflict,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            std::io::ErrorKind::NotADirectory => ErrorKind::NotADirectory,
            std::io::ErrorKind::IsADirectory => ErrorKind::NotAFile,
            std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::BrokenPipe => ErrorKind::ConnectionClosed,
            _ => ErrorKind::LocalError,
        };
        Error::new(kind, err)
    }
}
