//! The parsed representation of control channel command lines.

use std::fmt;

/// A password as received in `PASS`. Keeps the secret out of Debug output and
/// hence out of the logs.
#[derive(PartialEq, Eq, Clone)]
pub(crate) struct Password(String);

impl Password {
    pub fn new<S: Into<String>>(password: S) -> Password {
        Password(password.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "********")
    }
}

impl From<&str> for Password {
    fn from(password: &str) -> Password {
        Password::new(password)
    }
}

/// One FTP command as the dispatcher sees it. Verbs the server does not
/// implement parse to [`Command::Other`] so the client gets a proper 502
/// instead of a dropped connection.
#[derive(Debug, PartialEq, Eq, Clone)]
pub(crate) enum Command {
    User {
        /// The username to stash; authentication happens at `PASS`.
        username: String,
    },
    Pass {
        /// The password to check against the stashed username.
        password: Password,
    },
    Quit,
    Noop,
    Syst,
    Type {
        /// The representation type argument, still unvalidated.
        param: String,
    },
    Pwd,
    Cwd {
        /// The virtual directory to change to.
        path: String,
    },
    Cdup,
    Mkd {
        /// The virtual path of the directory to create.
        path: String,
    },
    Rmd {
        /// The virtual path of the directory to delete, recursively.
        path: String,
    },
    Dele {
        /// The virtual path of the file to delete.
        path: String,
    },
    Size {
        /// The virtual path of the file whose byte count is requested.
        path: String,
    },
    Mdtm {
        /// The virtual path of the file whose mtime is requested.
        path: String,
    },
    Rnfr {
        /// The rename source; must exist.
        path: String,
    },
    Rnto {
        /// The rename destination.
        path: String,
    },
    Port {
        /// The raw `h1,h2,h3,h4,p1,p2` endpoint specification.
        addr: String,
    },
    Pasv,
    Rest {
        /// Restart offset for the next `RETR`/`STOR`.
        offset: u64,
    },
    List {
        /// Directory to list; the working directory when absent.
        path: Option<String>,
    },
    Nlst {
        /// Directory to name-list; the working directory when absent.
        path: Option<String>,
    },
    Retr {
        /// The virtual path of the file to stream to the client.
        path: String,
    },
    Stor {
        /// The virtual path of the file to receive from the client.
        path: String,
    },
    Appe {
        /// The virtual path of the file to append the upload to.
        path: String,
    },
    Other {
        /// The uppercased verb we don't implement.
        command_name: String,
        /// Whatever arguments came with it.
        arguments: String,
    },
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
