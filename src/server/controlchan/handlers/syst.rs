//! The RFC 959 System (`SYST`) command.
//
// Clients use the reply to decide how to parse listings, so we always claim
// to be UNIX no matter the host.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::reply::{Reply, ReplyCode};
use async_trait::async_trait;

#[derive(Debug)]
pub(crate) struct Syst;

#[async_trait]
impl CommandHandler for Syst {
    async fn handle(&self, _args: CommandContext) -> Result<Reply, ControlChanError> {
        Ok(Reply::new(ReplyCode::SystemType, "UNIX Type: L8"))
    }
}
