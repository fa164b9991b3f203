//! Contains code pertaining to the communication between the data and control
//! channels.

use crate::fs;

/// Status messages from a transfer task to its session's control loop. The
/// loop turns each into the terminal reply of the transfer that produced it.
#[derive(Debug)]
pub(crate) enum ControlChanMsg {
    /// The file was streamed to the client completely.
    SentData {
        /// Number of payload bytes sent.
        bytes: u64,
    },
    /// The client's upload was written out completely.
    WrittenData {
        /// Number of payload bytes received.
        bytes: u64,
    },
    /// A LIST or NLST payload was delivered.
    DirectoryListed,
    /// The transfer died after the preliminary reply went out.
    TransferFailed {
        /// What went wrong while the bytes were moving.
        error: fs::Error,
    },
}
