//! The RFC 959 Remove Directory (`RMD`) command.
//
// Deletion is recursive, matching what graphical clients expect when they
// delete a folder. The sandbox root itself is off limits.

use super::fs_error_reply;
use crate::fs::{self, cap_fs};
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::reply::{Reply, ReplyCode};
use async_trait::async_trait;
use std::path::{Component, Path};

#[derive(Debug)]
pub(crate) struct Rmd {
    path: String,
}

impl Rmd {
    pub fn new(path: String) -> Rmd {
        Rmd { path }
    }
}

// True when the relative path walks back to the root it is relative to, e.g.
// `.` or `dir1/..`.
fn points_at_root(relative: &Path) -> bool {
    let mut depth: i32 = 0;
    for component in relative.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::ParentDir => depth -= 1,
            _ => {}
        }
    }
    depth == 0
}

#[async_trait]
impl CommandHandler for Rmd {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let cwd = args.session.lock().await.cwd.clone();
        let relative = match args.resolver.relative(&cwd, &self.path) {
            Ok(relative) => relative,
            Err(err) => return Ok(fs_error_reply(&err)),
        };
        if points_at_root(&relative) {
            return Ok(Reply::new(ReplyCode::FileError, "Cannot remove the root directory"));
        }
        match cap_fs::metadata(args.resolver.dir(), &relative).await {
            Ok(meta) if !meta.is_dir() => return Ok(fs_error_reply(&fs::ErrorKind::NotADirectory.into())),
            Err(err) => return Ok(fs_error_reply(&err.into())),
            Ok(_) => {}
        }
        match cap_fs::remove_dir_all(args.resolver.dir(), &relative).await {
            Ok(()) => Ok(Reply::new(ReplyCode::FileActionOkay, "Directory removed")),
            Err(err) => Ok(fs_error_reply(&err.into())),
        }
    }
}
