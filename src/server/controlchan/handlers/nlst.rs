//! The RFC 959 Name List (`NLST`) command.
//
// Like LIST, but the payload is bare names only, which is what scripted
// clients feed into further commands.

use super::{connect_data_channel, fs_error_reply};
use crate::fs::{self, listing};
use crate::server::chancomms::ControlChanMsg;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::reply::{Reply, ReplyCode};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

#[derive(Debug)]
pub(crate) struct Nlst {
    path: Option<String>,
}

impl Nlst {
    pub fn new(path: Option<String>) -> Nlst {
        Nlst { path }
    }
}

#[async_trait]
impl CommandHandler for Nlst {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let (cwd, intent) = {
            let mut session = args.session.lock().await;
            (session.cwd.clone(), session.take_data_chan())
        };

        let target = self.path.as_deref().unwrap_or(".");
        let relative = match args.resolver.relative(&cwd, target) {
            Ok(relative) => relative,
            Err(err) => return Ok(fs_error_reply(&err)),
        };
        let entries = match listing::scan_dir(args.resolver.dir(), relative).await {
            Ok(entries) => entries,
            Err(err) => return Ok(fs_error_reply(&err)),
        };
        let payload = listing::format_names(&entries);

        let mut socket = match connect_data_channel(intent, &args.logger).await {
            Ok(socket) => socket,
            Err(reply) => return Ok(reply),
        };

        let tx = args.tx_control_chan.clone();
        let logger = args.logger.clone();
        let task = tokio::spawn(async move {
            let result = async {
                socket.write_all(payload.as_bytes()).await?;
                socket.shutdown().await
            }
            .await;
            let msg = match result {
                Ok(()) => ControlChanMsg::DirectoryListed,
                Err(err) => {
                    slog::warn!(logger, "NLST failed while sending: {}", err);
                    ControlChanMsg::TransferFailed {
                        error: fs::Error::new(fs::ErrorKind::TransferFailed, err),
                    }
                }
            };
            if let Err(err) = tx.send(msg).await {
                slog::warn!(logger, "Could not report transfer outcome: {}", err);
            }
        });
        args.session.lock().await.transfer_task = Some(task);

        Ok(Reply::new(ReplyCode::FileStatusOkay, "Sending name list"))
    }
}
