//! The RFC 959 Make Directory (`MKD`) command.

use super::fs_error_reply;
use crate::fs::{cap_fs, normalize_virtual};
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::reply::{Reply, ReplyCode};
use async_trait::async_trait;

#[derive(Debug)]
pub(crate) struct Mkd {
    path: String,
}

impl Mkd {
    pub fn new(path: String) -> Mkd {
        Mkd { path }
    }
}

#[async_trait]
impl CommandHandler for Mkd {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let cwd = args.session.lock().await.cwd.clone();
        let relative = match args.resolver.relative(&cwd, &self.path) {
            Ok(relative) => relative,
            Err(err) => return Ok(fs_error_reply(&err)),
        };
        match cap_fs::create_dir(args.resolver.dir(), &relative).await {
            Ok(()) => {
                // The 257 reply carries the quoted virtual path of what was
                // just created.
                let virtual_path = normalize_virtual(&cwd, &self.path);
                Ok(Reply::new_with_string(ReplyCode::DirCreated, format!("\"{virtual_path}\" directory created")))
            }
            Err(err) => Ok(fs_error_reply(&err.into())),
        }
    }
}
