//! One handler per implemented verb. Each handler is constructed from its
//! parsed arguments and receives the shared session plus collaborators
//! through a [`CommandContext`](super::handler::CommandContext), which keeps
//! every verb testable on its own.

mod appe;
mod cdup;
mod cwd;
mod dele;
mod list;
mod mdtm;
mod mkd;
mod nlst;
mod noop;
mod other;
mod pass;
mod pasv;
mod port;
mod pwd;
mod quit;
mod rest;
mod retr;
mod rmd;
mod rnfr;
mod rnto;
mod size;
mod stor;
mod syst;
mod type_;
mod user;

pub(crate) use appe::Appe;
pub(crate) use cdup::Cdup;
pub(crate) use cwd::Cwd;
pub(crate) use dele::Dele;
pub(crate) use list::List;
pub(crate) use mdtm::Mdtm;
pub(crate) use mkd::Mkd;
pub(crate) use nlst::Nlst;
pub(crate) use noop::Noop;
pub(crate) use other::Other;
pub(crate) use pass::Pass;
pub(crate) use pasv::Pasv;
pub(crate) use port::Port;
pub(crate) use pwd::Pwd;
pub(crate) use quit::Quit;
pub(crate) use rest::Rest;
pub(crate) use retr::Retr;
pub(crate) use rmd::Rmd;
pub(crate) use rnfr::Rnfr;
pub(crate) use rnto::Rnto;
pub(crate) use size::Size;
pub(crate) use stor::Stor;
pub(crate) use syst::Syst;
pub(crate) use type_::Type;
pub(crate) use user::User;

use crate::fs;
use crate::server::controlchan::reply::{Reply, ReplyCode};
use crate::server::datachan::{self, DataChanIntent};
use tokio::net::TcpStream;

// Every sandboxed filesystem failure maps to a 550 with the failure class as
// text. Sandbox violations deliberately stay 550 as well; a 530 would send
// clients into a pointless re-login loop.
pub(super) fn fs_error_reply(err: &fs::Error) -> Reply {
    Reply::new_with_string(ReplyCode::FileError, err.kind().to_string())
}

// Turns a taken data channel intent into a connection, mapping failure to the
// 425 the transfer verbs all share.
pub(super) async fn connect_data_channel(intent: DataChanIntent, logger: &slog::Logger) -> Result<TcpStream, Reply> {
    match datachan::establish(intent).await {
        Ok(socket) => {
            slog::debug!(logger, "Data channel established with {:?}", socket.peer_addr());
            Ok(socket)
        }
        Err(err) => {
            slog::warn!(logger, "Could not establish data channel: {}", err);
            Err(Reply::new(ReplyCode::CantOpenDataConnection, "Can't open data connection"))
        }
    }
}
