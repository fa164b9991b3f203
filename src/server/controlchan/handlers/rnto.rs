//! The RFC 959 Rename To (`RNTO`) command.

use super::fs_error_reply;
use crate::fs::cap_fs;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::reply::{Reply, ReplyCode};
use async_trait::async_trait;

#[derive(Debug)]
pub(crate) struct Rnto {
    path: String,
}

impl Rnto {
    pub fn new(path: String) -> Rnto {
        Rnto { path }
    }
}

#[async_trait]
impl CommandHandler for Rnto {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        // Taking the source clears it whatever happens next: a failed RNTO
        // needs a fresh RNFR.
        let (cwd, from) = {
            let mut session = args.session.lock().await;
            (session.cwd.clone(), session.rename_from.take())
        };
        let from = match from {
            Some(from) => from,
            None => return Ok(Reply::new(ReplyCode::BadCommandSequence, "Issue RNFR first")),
        };
        let to = match args.resolver.relative(&cwd, &self.path) {
            Ok(to) => to,
            Err(err) => return Ok(fs_error_reply(&err)),
        };
        match cap_fs::rename(args.resolver.dir(), &from, &to).await {
            Ok(()) => Ok(Reply::new(ReplyCode::FileActionOkay, "Rename successful")),
            Err(err) => Ok(fs_error_reply(&err.into())),
        }
    }
}
