//! The RFC 959 Print Working Directory (`PWD`) command.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::reply::{Reply, ReplyCode};
use async_trait::async_trait;

#[derive(Debug)]
pub(crate) struct Pwd;

#[async_trait]
impl CommandHandler for Pwd {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        // Double quotes around the path are part of the 257 reply format.
        Ok(Reply::new_with_string(
            ReplyCode::DirCreated,
            format!("\"{}\" is current directory", session.cwd),
        ))
    }
}
