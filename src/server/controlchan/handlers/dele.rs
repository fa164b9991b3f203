//! The RFC 959 Delete (`DELE`) command.

use super::fs_error_reply;
use crate::fs::{self, cap_fs};
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::reply::{Reply, ReplyCode};
use async_trait::async_trait;

#[derive(Debug)]
pub(crate) struct Dele {
    path: String,
}

impl Dele {
    pub fn new(path: String) -> Dele {
        Dele { path }
    }
}

#[async_trait]
impl CommandHandler for Dele {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let cwd = args.session.lock().await.cwd.clone();
        let relative = match args.resolver.relative(&cwd, &self.path) {
            Ok(relative) => relative,
            Err(err) => return Ok(fs_error_reply(&err)),
        };
        match cap_fs::metadata(args.resolver.dir(), &relative).await {
            Ok(meta) if !meta.is_file() => return Ok(fs_error_reply(&fs::ErrorKind::NotAFile.into())),
            Err(err) => return Ok(fs_error_reply(&err.into())),
            Ok(_) => {}
        }
        match cap_fs::remove_file(args.resolver.dir(), &relative).await {
            Ok(()) => Ok(Reply::new(ReplyCode::FileActionOkay, "File successfully removed")),
            Err(err) => Ok(fs_error_reply(&err.into())),
        }
    }
}
