//! The per-connection control channel loop: reads command lines, gates them
//! on authentication, dispatches to the verb handlers and writes replies.

use crate::auth::Authenticator;
use crate::fs::PathResolver;
use crate::server::chancomms::ControlChanMsg;
use crate::server::controlchan::codec::FtpCodec;
use crate::server::controlchan::command::Command;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::handlers;
use crate::server::controlchan::parser::{self, ParseError, ParseErrorKind};
use crate::server::controlchan::reply::{Reply, ReplyCode};
use crate::server::session::{Session, SharedSession};
use crate::server::shutdown;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::sync::mpsc;
use tokio::sync::OwnedSemaphorePermit;
use tokio_util::codec::Framed;

/// Everything a control channel loop needs from the server that spawned it.
pub(crate) struct ControlParams {
    pub greeting: &'static str,
    pub authenticator: Arc<dyn Authenticator>,
    pub resolver: Arc<PathResolver>,
    pub passive_ports: RangeInclusive<u16>,
    pub idle_timeout: Duration,
    pub logger: slog::Logger,
}

/// Does TCP processing when an FTP client connects: sends the welcome banner,
/// then runs the command loop in a task of its own until the client leaves,
/// errs out, idles too long or the server shuts down.
pub(crate) async fn spawn_loop(
    params: ControlParams,
    tcp_stream: TcpStream,
    mut shutdown: shutdown::Watcher,
    permit: Option<OwnedSemaphorePermit>,
) -> Result<(), ControlChanError> {
    let local_addr = tcp_stream.local_addr()?;
    let peer_addr = tcp_stream.peer_addr()?;
    let logger = params.logger.new(slog::o!(
        "session" => uuid::Uuid::new_v4().to_string(),
        "peer" => peer_addr.to_string(),
    ));

    let session: SharedSession = Arc::new(Mutex::new(Session::new()));
    let (tx_control_chan, mut rx_control_chan) = mpsc::channel::<ControlChanMsg>(1);

    let mut framed = Framed::new(tcp_stream, FtpCodec::new());
    framed.send(Reply::new(ReplyCode::ServiceReady, params.greeting)).await?;

    tokio::spawn(async move {
        // Held for the lifetime of the session so the listener's session
        // limit stays accurate.
        let _permit = permit;
        let (mut reply_sink, mut command_source) = framed.split();
        loop {
            tokio::select! {
                item = command_source.next() => match item {
                    Some(Ok(line)) => {
                        let (reply, close) = handle_line(&params, &session, &tx_control_chan, local_addr, &logger, line).await;
                        slog::debug!(logger, "Control channel reply {:?}", reply);
                        if reply_sink.send(reply).await.is_err() {
                            slog::warn!(logger, "Could not send reply");
                            break;
                        }
                        if close {
                            break;
                        }
                    }
                    Some(Err(err)) => {
                        slog::warn!(logger, "Control channel error: {}", err);
                        break;
                    }
                    None => {
                        slog::debug!(logger, "Client closed the control channel");
                        break;
                    }
                },
                Some(msg) = rx_control_chan.recv() => {
                    let reply = transfer_outcome_reply(msg);
                    slog::debug!(logger, "Control channel reply {:?}", reply);
                    if reply_sink.send(reply).await.is_err() {
                        slog::warn!(logger, "Could not send transfer outcome reply");
                        break;
                    }
                },
                _ = tokio::time::sleep(params.idle_timeout) => {
                    slog::info!(logger, "Idle session timed out");
                    let reply = Reply::new(ReplyCode::ServiceNotAvailable, "Session timed out, closing control connection");
                    let _ = reply_sink.send(reply).await;
                    break;
                }
                _ = shutdown.wait() => {
                    slog::info!(logger, "Server is shutting down, closing session");
                    let reply = Reply::new(ReplyCode::ServiceNotAvailable, "Service shutting down, closing control connection");
                    let _ = reply_sink.send(reply).await;
                    break;
                }
            }
        }
        // A pending PORT/PASV intent dies with the session, and a transfer
        // still in flight is aborted, which closes its data socket.
        {
            let mut session = session.lock().await;
            session.take_data_chan();
            if let Some(task) = session.transfer_task.take() {
                task.abort();
            }
        }
        let _ = reply_sink.flush().await;
        let _ = reply_sink.close().await;
        slog::info!(logger, "Session ended");
    });

    Ok(())
}

// Parses, auth-gates and dispatches one line. The bool says whether the
// connection should close after the reply goes out.
async fn handle_line(
    params: &ControlParams,
    session: &SharedSession,
    tx_control_chan: &mpsc::Sender<ControlChanMsg>,
    local_addr: SocketAddr,
    logger: &slog::Logger,
    line: Bytes,
) -> (Reply, bool) {
    let cmd = match parser::parse(&line) {
        Ok(cmd) => cmd,
        Err(err) => {
            slog::debug!(logger, "Received unparseable line: {}", err);
            return (parse_error_reply(&err), false);
        }
    };
    slog::debug!(logger, "Received command {:?}", cmd);

    let close = matches!(cmd, Command::Quit);
    if !session.lock().await.authenticated && requires_auth(&cmd) {
        return (Reply::new(ReplyCode::NotLoggedIn, "Not logged in"), false);
    }

    let handler = dispatch(cmd);
    let args = CommandContext {
        session: session.clone(),
        authenticator: params.authenticator.clone(),
        resolver: params.resolver.clone(),
        passive_ports: params.passive_ports.clone(),
        tx_control_chan: tx_control_chan.clone(),
        local_addr,
        logger: logger.clone(),
    };
    match handler.handle(args).await {
        Ok(reply) => (reply, close),
        Err(err) => {
            // Handlers answer for their own failures; anything that still
            // escapes becomes a 550 and the session carries on.
            slog::error!(logger, "Handler error: {}", err);
            (Reply::new(ReplyCode::FileError, "Internal server error"), false)
        }
    }
}

// The fixed verb table: each parsed command maps to its handler.
fn dispatch(cmd: Command) -> Box<dyn CommandHandler> {
    match cmd {
        Command::User { username } => Box::new(handlers::User::new(username)),
        Command::Pass { password } => Box::new(handlers::Pass::new(password)),
        Command::Quit => Box::new(handlers::Quit),
        Command::Noop => Box::new(handlers::Noop),
        Command::Syst => Box::new(handlers::Syst),
        Command::Type { param } => Box::new(handlers::Type::new(param)),
        Command::Pwd => Box::new(handlers::Pwd),
        Command::Cwd { path } => Box::new(handlers::Cwd::new(path)),
        Command::Cdup => Box::new(handlers::Cdup),
        Command::Mkd { path } => Box::new(handlers::Mkd::new(path)),
        Command::Rmd { path } => Box::new(handlers::Rmd::new(path)),
        Command::Dele { path } => Box::new(handlers::Dele::new(path)),
        Command::Size { path } => Box::new(handlers::Size::new(path)),
        Command::Mdtm { path } => Box::new(handlers::Mdtm::new(path)),
        Command::Rnfr { path } => Box::new(handlers::Rnfr::new(path)),
        Command::Rnto { path } => Box::new(handlers::Rnto::new(path)),
        Command::Port { addr } => Box::new(handlers::Port::new(addr)),
        Command::Pasv => Box::new(handlers::Pasv),
        Command::Rest { offset } => Box::new(handlers::Rest::new(offset)),
        Command::List { path } => Box::new(handlers::List::new(path)),
        Command::Nlst { path } => Box::new(handlers::Nlst::new(path)),
        Command::Retr { path } => Box::new(handlers::Retr::new(path)),
        Command::Stor { path } => Box::new(handlers::Stor::new(path)),
        Command::Appe { path } => Box::new(handlers::Appe::new(path)),
        Command::Other { command_name, .. } => Box::new(handlers::Other::new(command_name)),
    }
}

// USER, PASS, QUIT and NOOP are the only verbs an unauthenticated session
// may issue. Everything else, unknown verbs included, gets a 530.
fn requires_auth(cmd: &Command) -> bool {
    !matches!(
        cmd,
        Command::User { .. } | Command::Pass { .. } | Command::Quit | Command::Noop
    )
}

fn parse_error_reply(err: &ParseError) -> Reply {
    match err.kind() {
        ParseErrorKind::InvalidCommand => Reply::new(ReplyCode::ParameterSyntaxError, "Invalid parameter"),
        ParseErrorKind::InvalidEol | ParseErrorKind::InvalidToken | ParseErrorKind::InvalidUtf8 => {
            Reply::new(ReplyCode::CommandSyntaxError, "Command syntax error")
        }
    }
}

// Transfer tasks report back through the session's message channel; their
// outcome is the terminal reply of the 150 sent earlier.
fn transfer_outcome_reply(msg: ControlChanMsg) -> Reply {
    match msg {
        ControlChanMsg::SentData { .. } | ControlChanMsg::WrittenData { .. } => {
            Reply::new(ReplyCode::ClosingDataConnection, "Transfer complete")
        }
        ControlChanMsg::DirectoryListed => Reply::new(ReplyCode::ClosingDataConnection, "Directory successfully transmitted"),
        ControlChanMsg::TransferFailed { error } => handlers::fs_error_reply(&error),
    }
}
