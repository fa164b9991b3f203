//! Per-connection protocol state.

use super::datachan::DataChanIntent;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A session handle shared between the control loop and command handlers.
pub(crate) type SharedSession = Arc<Mutex<Session>>;

/// The representation type negotiated with `TYPE`. Transfers are
/// byte-transparent either way; the setting is advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransferType {
    /// `TYPE A`
    Ascii,
    /// `TYPE I`
    Image,
}

// This is where we keep the state for an FTP session.
#[derive(Debug)]
pub(crate) struct Session {
    /// Set by `USER`. A fresh `USER` always drops authentication.
    pub username: Option<String>,
    /// True iff the last `PASS` succeeded for the currently set username.
    pub authenticated: bool,
    /// Virtual working directory: `/`-rooted, normalized, no trailing slash
    /// except for `/` itself.
    pub cwd: String,
    /// Root-relative path captured by `RNFR`, consumed by the next `RNTO`.
    pub rename_from: Option<PathBuf>,
    /// The starting byte for the next `RETR` or `STOR`. Set by the _Restart of
    /// Interrupted Transfer (REST)_ command to support resume functionality.
    pub start_pos: u64,
    /// Advisory representation type.
    pub transfer_type: TransferType,
    /// Where the next transfer gets its data connection from.
    pub data_chan: DataChanIntent,
    /// The task moving bytes for the transfer in flight, if any. Aborted when
    /// the session closes, which drops its data socket.
    pub transfer_task: Option<tokio::task::JoinHandle<()>>,
}

impl Session {
    pub fn new() -> Session {
        Session {
            username: None,
            authenticated: false,
            cwd: "/".to_string(),
            rename_from: None,
            start_pos: 0,
            transfer_type: TransferType::Image,
            data_chan: DataChanIntent::None,
            transfer_task: None,
        }
    }

    /// Takes the data channel intent, leaving `None` behind. Dropping the old
    /// intent closes any passive listener it held.
    pub fn take_data_chan(&mut self) -> DataChanIntent {
        std::mem::replace(&mut self.data_chan, DataChanIntent::None)
    }

    /// Consumes the restart marker. `REST` is single-shot: whatever transfer
    /// comes next gets the offset, everything after starts from zero again.
    pub fn take_start_pos(&mut self) -> u64 {
        std::mem::take(&mut self.start_pos)
    }
}
