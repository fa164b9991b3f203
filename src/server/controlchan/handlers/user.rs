//! The RFC 959 User Name (`USER`) command.
//
// The argument field is a Telnet string identifying the user. The user
// identification is that which is required by the server for access to its
// file system. A fresh USER drops any authentication already in place.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::reply::{Reply, ReplyCode};
use async_trait::async_trait;

#[derive(Debug)]
pub(crate) struct User {
    username: String,
}

impl User {
    pub fn new(username: String) -> User {
        User { username }
    }
}

#[async_trait]
impl CommandHandler for User {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        session.username = Some(self.username.clone());
        session.authenticated = false;
        Ok(Reply::new(ReplyCode::NeedPassword, "Password required"))
    }
}
