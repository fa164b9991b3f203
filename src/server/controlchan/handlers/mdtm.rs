//! The RFC 3659 Modification Time (`MDTM`) command.
//
// Replies with the last-modified instant in UTC as `YYYYMMDDHHMMSS`.

use super::fs_error_reply;
use crate::fs::cap_fs;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::reply::{Reply, ReplyCode};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[derive(Debug)]
pub(crate) struct Mdtm {
    path: String,
}

impl Mdtm {
    pub fn new(path: String) -> Mdtm {
        Mdtm { path }
    }
}

#[async_trait]
impl CommandHandler for Mdtm {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let cwd = args.session.lock().await.cwd.clone();
        let relative = match args.resolver.relative(&cwd, &self.path) {
            Ok(relative) => relative,
            Err(err) => return Ok(fs_error_reply(&err)),
        };
        let modified = match cap_fs::metadata(args.resolver.dir(), &relative)
            .await
            .and_then(|meta| meta.modified())
        {
            Ok(modified) => modified.into_std(),
            Err(err) => return Ok(fs_error_reply(&err.into())),
        };
        let timestamp = DateTime::<Utc>::from(modified).format("%Y%m%d%H%M%S");
        Ok(Reply::new_with_string(ReplyCode::FileStatus, timestamp.to_string()))
    }
}
