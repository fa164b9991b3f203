//! The RFC 959 Representation Type (`TYPE`) command.
//
// Only ASCII and Image are accepted, case-insensitively. The setting is
// purely advisory: transfers are byte-transparent either way, we never
// rewrite line endings.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::reply::{Reply, ReplyCode};
use crate::server::session::TransferType;
use async_trait::async_trait;

#[derive(Debug)]
pub(crate) struct Type {
    param: String,
}

impl Type {
    pub fn new(param: String) -> Type {
        Type { param }
    }
}

#[async_trait]
impl CommandHandler for Type {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        match self.param.trim().to_uppercase().as_str() {
            "A" => {
                args.session.lock().await.transfer_type = TransferType::Ascii;
                Ok(Reply::new(ReplyCode::CommandOkay, "Type set to ASCII"))
            }
            "I" => {
                args.session.lock().await.transfer_type = TransferType::Image;
                Ok(Reply::new(ReplyCode::CommandOkay, "Type set to binary"))
            }
            _ => Ok(Reply::new(
                ReplyCode::CommandNotImplementedForParameter,
                "Command not implemented for that parameter",
            )),
        }
    }
}
