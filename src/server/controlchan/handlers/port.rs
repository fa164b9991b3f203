//! The RFC 959 Data Port (`PORT`) command.
//
// The argument is the concatenation of a 32-bit internet host address and a
// 16-bit TCP port address, broken into six 8-bit fields transmitted as
// decimal numbers separated by commas: `PORT h1,h2,h3,h4,p1,p2`. The server
// initiates the data connection to that endpoint when the next transfer
// command runs.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::reply::{Reply, ReplyCode};
use crate::server::datachan::{DataChanIntent, parse_port_argument};
use async_trait::async_trait;

#[derive(Debug)]
pub(crate) struct Port {
    addr: String,
}

impl Port {
    pub fn new(addr: String) -> Port {
        Port { addr }
    }
}

#[async_trait]
impl CommandHandler for Port {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        match parse_port_argument(&self.addr) {
            Some(endpoint) => {
                slog::debug!(args.logger, "Active data channel endpoint set to {}", endpoint);
                // Replaces any earlier PORT or PASV; a pending passive
                // listener closes here.
                args.session.lock().await.data_chan = DataChanIntent::Active(endpoint);
                Ok(Reply::new(ReplyCode::CommandOkay, "PORT command successful"))
            }
            None => Ok(Reply::new(ReplyCode::ParameterSyntaxError, "Illegal PORT command")),
        }
    }
}
