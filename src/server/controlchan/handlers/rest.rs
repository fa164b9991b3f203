//! The RFC 3659 Restart of Interrupted Transfer (`REST`) command.
//
// The marker is a plain byte offset. It applies to the next RETR or STOR
// only; APPE ignores it and no other verb observes it.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::reply::{Reply, ReplyCode};
use async_trait::async_trait;

#[derive(Debug)]
pub(crate) struct Rest {
    offset: u64,
}

impl Rest {
    pub fn new(offset: u64) -> Rest {
        Rest { offset }
    }
}

#[async_trait]
impl CommandHandler for Rest {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        args.session.lock().await.start_pos = self.offset;
        Ok(Reply::new_with_string(
            ReplyCode::FileActionPending,
            format!("Restart position accepted ({})", self.offset),
        ))
    }
}
