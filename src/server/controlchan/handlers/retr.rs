//! The RFC 959 Retrieve (`RETR`) command.
//
// Sequencing matters here: the path is resolved and the file opened first,
// then the data connection comes up, and only then does the 150 go out.
// Clients start reading the moment they see the 150. The byte copy itself
// runs in its own task; its outcome comes back to the control loop as a
// message and becomes the terminal 226 or 550.

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
pub(crate) struct Retr {
    path: String,
}

impl Retr {
    pub fn new(path: String) -> Retr {
        Retr { path }
    }
}

#[async_trait]
impl CommandHandler for Retr {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        // The intent is taken up front: whether this transfer succeeds or
        // dies in validation, the channel is spent.
        let (cwd, start_pos, intent) = {
            let mut session = args.session.lock().await;
            (session.cwd.clone(), session.take_start_pos(), session.take_data_chan())
        };

        let relative = match args.resolver.relative(&cwd, &self.path) {
            Ok(relative) => relative,
            Err(err) => return Ok(fs_error_reply(&err)),
        };
        match cap_fs::metadata(args.resolver.dir(), &relative).await {
            Ok(meta) if !meta.is_file() => return Ok(fs_error_reply(&fs::ErrorKind::NotAFile.into())),
            Err(err) => return Ok(fs_error_reply(&err.into())),
            Ok(_) => {}
        }
        let file = match cap_fs::open(args.resolver.dir(), &relative).await {
            Ok(file) => file,
            Err(err) => return Ok(fs_error_reply(&err.into())),
        };
        let mut file = tokio::fs::File::from_std(file.into_std());
        if start_pos > 0 {
            let seeked = file.seek(SeekFrom::Start(start_pos)).await;
            if let Err(err) = seeked {
                return Ok(fs_error_reply(&err.into()));
            }
        }

        let mut socket = match connect_data_channel(intent, &args.logger).await {
            Ok(socket) => socket,
            Err(reply) => return Ok(reply),
        };

        let tx = args.tx_control_chan.clone();
        let logger = args.logger.clone();
        let task = tokio::spawn(async move {
            let result = async {
                let bytes = tokio::io::copy(&mut file, &mut socket).await?;
                socket.shutdown().await?;
                Ok::<u64, std::io::Error>(bytes)
            }
            .await;
            let msg = match result {
                Ok(bytes) => {
                    slog::debug!(logger, "Sent {} bytes over the data channel", bytes);
                    ControlChanMsg::SentData { bytes }
                }
                Err(err) => {
                    slog::warn!(logger, "RETR failed while sending: {}", err);
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

        Ok(Reply::new(ReplyCode::FileStatusOkay, "Sending data"))
    }
}
