//! Fallback for verbs this server does not implement.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::reply::{Reply, ReplyCode};
use async_trait::async_trait;

#[derive(Debug)]
pub(crate) struct Other {
    command_name: String,
}

impl Other {
    pub fn new(command_name: String) -> Other {
        Other { command_name }
    }
}

#[async_trait]
impl CommandHandler for Other {
    async fn handle(&self, _args: CommandContext) -> Result<Reply, ControlChanError> {
        Ok(Reply::new_with_string(
            ReplyCode::CommandNotImplemented,
            format!("Command not implemented: {}", self.command_name),
        ))
    }
}
