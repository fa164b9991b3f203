//! The RFC 959 Passive (`PASV`) command.
//
// This command requests the server to "listen" on a data port (which is not
// its default data port) and to wait for a connection rather than initiate
// one upon receipt of a transfer command. The response includes the host and
// port address this server is listening on: the advertised host octets are
// those of the control connection's local address, never 0.0.0.0.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::reply::{Reply, ReplyCode};
use crate::server::datachan::{DataChanIntent, bind_passive};
use async_trait::async_trait;
use std::net::SocketAddr;

#[derive(Debug)]
pub(crate) struct Pasv;

#[async_trait]
impl CommandHandler for Pasv {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let conn_addr = match args.local_addr {
            SocketAddr::V4(addr) => addr,
            // We only emit IPv4 address literals.
            SocketAddr::V6(_) => return Ok(Reply::new(ReplyCode::CantOpenDataConnection, "No data connection established")),
        };

        let listener = match bind_passive(*conn_addr.ip(), &args.passive_ports).await {
            Ok(listener) => listener,
            Err(err) => {
                slog::warn!(args.logger, "Could not bind a passive port: {}", err);
                return Ok(Reply::new(ReplyCode::CantOpenDataConnection, "No data connection established"));
            }
        };
        let port = listener.local_addr()?.port();
        slog::debug!(args.logger, "Passive listener bound on port {}", port);

        // The next transfer accepts exactly one client here; replacing an
        // earlier intent closes whatever it held.
        args.session.lock().await.data_chan = DataChanIntent::Passive(listener);

        let octets = conn_addr.ip().octets();
        let p1 = port >> 8;
        let p2 = port & 0xff;
        Ok(Reply::new_with_string(
            ReplyCode::EnteringPassiveMode,
            format!("Entering Passive Mode ({},{},{},{},{},{})", octets[0], octets[1], octets[2], octets[3], p1, p2),
        ))
    }
}
