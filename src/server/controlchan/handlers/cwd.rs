//! The RFC 959 Change Working Directory (`CWD`) command.
//
// This command allows the user to work with a different directory for file
// storage or retrieval without altering his login or accounting information.
// The virtual working directory is stored in normalized form: whatever mix of
// `..` and duplicate slashes the client sent, `PWD` afterwards shows the
// collapsed path.

use super::fs_error_reply;
use crate::fs::{self, cap_fs, normalize_virtual};
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::reply::{Reply, ReplyCode};
use async_trait::async_trait;

#[derive(Debug)]
pub(crate) struct Cwd {
    path: String,
}

impl Cwd {
    pub fn new(path: String) -> Cwd {
        Cwd { path }
    }
}

#[async_trait]
impl CommandHandler for Cwd {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let cwd = args.session.lock().await.cwd.clone();
        let relative = match args.resolver.relative(&cwd, &self.path) {
            Ok(relative) => relative,
            Err(err) => return Ok(fs_error_reply(&err)),
        };
        match cap_fs::metadata(args.resolver.dir(), &relative).await {
            Ok(meta) if meta.is_dir() => {
                args.session.lock().await.cwd = normalize_virtual(&cwd, &self.path);
                Ok(Reply::new(ReplyCode::FileActionOkay, "Directory changed"))
            }
            Ok(_) => Ok(fs_error_reply(&fs::ErrorKind::NotADirectory.into())),
            Err(err) => Ok(fs_error_reply(&err.into())),
        }
    }
}
