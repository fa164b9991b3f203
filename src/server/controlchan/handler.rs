use crate::auth::Authenticator;
use crate::fs::PathResolver;
use crate::server::chancomms::ControlChanMsg;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::reply::Reply;
use crate::server::session::SharedSession;

use async_trait::async_trait;
use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::sync::mpsc::Sender;

// Common interface for all handlers of `Command`s.
#[async_trait]
pub(crate) trait CommandHandler: Send + Sync + std::fmt::Debug {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError>;
}

/// Represents arguments passed to a `CommandHandler`.
#[derive(Debug)]
pub(crate) struct CommandContext {
    pub session: SharedSession,
    pub authenticator: Arc<dyn Authenticator>,
    pub resolver: Arc<PathResolver>,
    pub passive_ports: RangeInclusive<u16>,
    pub tx_control_chan: Sender<ControlChanMsg>,
    pub local_addr: SocketAddr,
    pub logger: slog::Logger,
}
