use super::error::ControlChanError;
use super::reply::Reply;

use bytes::{Bytes, BytesMut};
use std::io::Write;
use tokio_util::codec::{Decoder, Encoder};

// FtpCodec implements tokio's `Decoder` and `Encoder` traits for the control
// channel. Decoding only splits off complete lines; interpretation is left to
// the parser so that a malformed command costs the client a 5xx reply, not the
// whole connection.
pub(crate) struct FtpCodec {
    // Where the newline search left off last time. Everything before this
    // offset was already scanned by an earlier `decode` call that came up
    // empty, so when more bytes arrive only the fresh tail is searched. Reset
    // to zero whenever a line is split off the front of the buffer.
    next_index: usize,
}

impl FtpCodec {
    pub fn new() -> FtpCodec {
        FtpCodec { next_index: 0 }
    }
}

impl Decoder for FtpCodec {
    type Item = Bytes;
    type Error = ControlChanError;

    // Splits off one line, terminator included. Called by tokio.
    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Bytes>, Self::Error> {
        if let Some(newline_offset) = buf[self.next_index..].iter().position(|b| *b == b'\n') {
            let newline_index = newline_offset + self.next_index;
            let line = buf.split_to(newline_index + 1);
            self.next_index = 0;
            Ok(Some(line.freeze()))
        } else {
            self.next_index = buf.len();
            Ok(None)
        }
    }
}

impl Encoder<Reply> for FtpCodec {
    type Error = ControlChanError;

    // Here we encode the outgoing response
    fn encode(&mut self, reply: Reply, buf: &mut BytesMut) -> Result<(), Self::Error> {
        let mut buffer = vec![];
        if reply.msg.is_empty() {
            writeln!(buffer, "{}\r", reply.code as u32)?;
        } else {
            writeln!(buffer, "{} {}\r", reply.code as u32, reply.msg)?;
        }
        buf.extend(&buffer);
        Ok(())
    }
}
