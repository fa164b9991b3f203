//! The RFC 959 Password (`PASS`) command.
//
// This command must be immediately preceded by the user name command, and
// completes the user's identification for access control.

use crate::server::controlchan::command::Password;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::reply::{Reply, ReplyCode};
use async_trait::async_trait;

#[derive(Debug)]
pub(crate) struct Pass {
    password: Password,
}

impl Pass {
    pub fn new(password: Password) -> Pass {
        Pass { password }
    }
}

#[async_trait]
impl CommandHandler for Pass {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let username = args.session.lock().await.username.clone();
        let username = match username {
            Some(username) => username,
            None => return Ok(Reply::new(ReplyCode::BadCommandSequence, "Please supply a username first")),
        };
        // The session lock is not held while the authenticator runs; backends
        // may take a while.
        match args.authenticator.authenticate(&username, self.password.as_str()).await {
            Ok(()) => {
                args.session.lock().await.authenticated = true;
                slog::info!(args.logger, "User logged in"; "username" => username.as_str());
                Ok(Reply::new(ReplyCode::UserLoggedIn, "User logged in, proceed"))
            }
            Err(err) => {
                args.session.lock().await.authenticated = false;
                slog::warn!(args.logger, "Failed login attempt: {}", err; "username" => username.as_str());
                Ok(Reply::new(ReplyCode::NotLoggedIn, "Authentication failed"))
            }
        }
    }
}
