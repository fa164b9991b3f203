//! The RFC 959 Store (`STOR`) command.
//
// Without a restart marker the target file is truncated. With one, it is
// truncated to the marker and writing continues from there, which is what
// resuming clients expect.

use super::{connect_data_channel, fs_error_reply};
use crate::fs::{self, cap_fs};
use crate::server::chancomms::ControlChanMsg;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::reply::{Reply, ReplyCode};
use async_trait::async_trait;
use std::io::SeekFrom;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

#[derive(Debug)]
pub(crate) struct Stor {
    path: String,
}

impl Stor {
    pub fn new(path: String) -> Stor {
        Stor { path }
    }
}

#[async_trait]
impl CommandHandler for Stor {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let (cwd, start_pos, intent) = {
            let mut session = args.session.lock().await;
            (session.cwd.clone(), session.take_start_pos(), session.take_data_chan())
        };

        let relative = match args.resolver.relative(&cwd, &self.path) {
            Ok(relative) => relative,
            Err(err) => return Ok(fs_error_reply(&err)),
        };
        let mut open_options = cap_std::fs::OpenOptions::new();
        open_options.write(true).create(true);
        let file = match cap_fs::open_with(args.resolver.dir(), &relative, open_options).await {
            Ok(file) => file,
            Err(err) => return Ok(fs_error_reply(&err.into())),
        };
        let mut file = tokio::fs::File::from_std(file.into_std());
        let positioned = async {
            file.set_len(start_pos).await?;
            file.seek(SeekFrom::Start(start_pos)).await
        }
        .await;
        if let Err(err) = positioned {
            return Ok(fs_error_reply(&err.into()));
        }

        let mut socket = match connect_data_channel(intent, &args.logger).await {
            Ok(socket) => socket,
            Err(reply) => return Ok(reply),
        };

        let tx = args.tx_control_chan.clone();
        let logger = args.logger.clone();
        let task = tokio::spawn(async move {
            let result = async {
                let bytes = tokio::io::copy(&mut socket, &mut file).await?;
                file.flush().await?;
                Ok::<u64, std::io::Error>(bytes)
            }
            .await;
            let msg = match result {
                Ok(bytes) => {
                    slog::debug!(logger, "Received {} bytes over the data channel", bytes);
                    ControlChanMsg::WrittenData { bytes }
                }
                Err(err) => {
                    slog::warn!(logger, "STOR failed while receiving: {}", err);
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

        Ok(Reply::new(ReplyCode::FileStatusOkay, "Ready to receive data"))
    }
}
