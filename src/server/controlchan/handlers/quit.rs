//! The RFC 959 Logout (`QUIT`) command.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::reply::{Reply, ReplyCode};
use async_trait::async_trait;

#[derive(Debug)]
pub(crate) struct Quit;

#[async_trait]
impl CommandHandler for Quit {
    async fn handle(&self, _args: CommandContext) -> Result<Reply, ControlChanError> {
        // The control loop closes the connection after this reply goes out.
        Ok(Reply::new(ReplyCode::ClosingControlConnection, "Goodbye"))
    }
}
