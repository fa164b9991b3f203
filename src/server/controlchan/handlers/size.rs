//! The RFC 3659 File Size (`SIZE`) command.

use super::fs_error_reply;
use crate::fs::{self, cap_fs};
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::reply::{Reply, ReplyCode};
use async_trait::async_trait;

#[derive(Debug)]
pub(crate) struct Size {
    path: String,
}

impl Size {
    pub fn new(path: String) -> Size {
        Size { path }
    }
}

#[async_trait]
impl CommandHandler for Size {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let cwd = args.session.lock().await.cwd.clone();
        let relative = match args.resolver.relative(&cwd, &self.path) {
            Ok(relative) => relative,
            Err(err) => return Ok(fs_error_reply(&err)),
        };
        match cap_fs::metadata(args.resolver.dir(), &relative).await {
            Ok(meta) if meta.is_file() => Ok(Reply::new_with_string(ReplyCode::FileStatus, meta.len().to_string())),
            Ok(_) => Ok(fs_error_reply(&fs::ErrorKind::NotAFile.into())),
            Err(err) => Ok(fs_error_reply(&err.into())),
        }
    }
}
