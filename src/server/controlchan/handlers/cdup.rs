//! The RFC 959 Change to Parent Directory (`CDUP`) command.
//
// The parent of the root is the root, so this can never fail.

use crate::fs::normalize_virtual;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::reply::{Reply, ReplyCode};
use async_trait::async_trait;

#[derive(Debug)]
pub(crate) struct Cdup;

#[async_trait]
impl CommandHandler for Cdup {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        session.cwd = normalize_virtual(&session.cwd, "..");
        Ok(Reply::new(ReplyCode::FileActionOkay, "Directory changed"))
    }
}
