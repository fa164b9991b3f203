//! Replies sent to the FTP client over the control channel.

/// A reply to the FTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reply {
    /// The reply code; the first digit is what clients actually act on.
    pub code: ReplyCode,
    /// Human-oriented text after the code.
    pub msg: String,
}

/// The reply codes we emit, according to RFC 959.
//
// Codes between 100 and 199 indicate marks; codes between 200 and 399 indicate
// acceptance; codes between 400 and 599 indicate rejection. Clients should
// avoid looking past the first digit; the remainder of a reply is primarily
// for human consumption (exceptions: 227 and 257 have a special format).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
#[allow(dead_code)]
pub(crate) enum ReplyCode {
    FileStatusOkay = 150,

    CommandOkay = 200,
    SystemStatus = 211,
    FileStatus = 213,
    SystemType = 215,
    ServiceReady = 220,
    ClosingControlConnection = 221,
    ClosingDataConnection = 226,
    EnteringPassiveMode = 227,
    UserLoggedIn = 230,
    FileActionOkay = 250,
    DirCreated = 257,

    NeedPassword = 331,
    FileActionPending = 350,

    ServiceNotAvailable = 421,
    CantOpenDataConnection = 425,
    ConnectionClosed = 426,
    TransientFileError = 450,
    LocalError = 451,

    CommandSyntaxError = 500,
    ParameterSyntaxError = 501,
    CommandNotImplemented = 502,
    BadCommandSequence = 503,
    CommandNotImplementedForParameter = 504,
    NotLoggedIn = 530,
    FileError = 550,
}

impl Reply {
    pub fn new(code: ReplyCode, message: &str) -> Reply {
        Reply {
            code,
            msg: message.to_string(),
        }
    }

    pub fn new_with_string(code: ReplyCode, msg: String) -> Reply {
        Reply { code, msg }
    }
}
