//! The RFC 959 Rename From (`RNFR`) command.

use super::fs_error_reply;
use crate::fs::cap_fs;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::reply::{Reply, ReplyCode};
use async_trait::async_trait;

#[derive(Debug)]
pub(crate) struct Rnfr {
    path: String,
}

impl Rnfr {
    pub fn new(path: String) -> Rnfr {
        Rnfr { path }
    }
}

#[async_trait]
impl CommandHandler for Rnfr {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let cwd = args.session.lock().await.cwd.clone();
        let relative = match args.resolver.relative(&cwd, &self.path) {
            Ok(relative) => relative,
            Err(err) => return Ok(fs_error_reply(&err)),
        };
        // Files and directories both rename; existence is all that matters.
        match cap_fs::metadata(args.resolver.dir(), &relative).await {
            Ok(_) => {
                args.session.lock().await.rename_from = Some(relative);
                Ok(Reply::new(ReplyCode::FileActionPending, "Ready for destination name"))
            }
            Err(err) => Ok(fs_error_reply(&err.into())),
        }
    }
}
