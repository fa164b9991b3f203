//! Contains code pertaining to the FTP *data* channel.
//!
//! A session carries at most one [`DataChanIntent`], put there by `PORT` or
//! `PASV` and consumed by the next transfer command. Establishment happens at
//! transfer time: exactly one outbound connect (active) or one accept
//! (passive) per transfer, after which the passive listener is gone.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::ops::RangeInclusive;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};

/// How long a transfer waits for its data connection to come up before the
/// client gets a 425.
pub(crate) const DATA_CHANNEL_TIMEOUT: Duration = Duration::from_secs(30);

const BIND_RETRIES: u8 = 10;

/// What the next transfer should do to obtain its data connection.
#[derive(Debug)]
pub(crate) enum DataChanIntent {
    /// No `PORT` or `PASV` was issued since the last transfer.
    None,
    /// `PORT`: connect out to the client-specified endpoint.
    Active(SocketAddrV4),
    /// `PASV`: accept one client on this already-bound listener.
    Passive(TcpListener),
}

/// Parses the `h1,h2,h3,h4,p1,p2` argument of `PORT`.
pub(crate) fn parse_port_argument(arg: &str) -> Option<SocketAddrV4> {
    let mut numbers = [0u8; 6];
    let mut parts = arg.split(',');
    for slot in numbers.iter_mut() {
        *slot = parts.next()?.trim().parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    let [h1, h2, h3, h4, p1, p2] = numbers;
    let port = (u16::from(p1) << 8) | u16::from(p2);
    Some(SocketAddrV4::new(Ipv4Addr::new(h1, h2, h3, h4), port))
}

/// Binds a listener for passive mode on the given IP, drawing random ports
/// from the configured range until one of them is free.
pub(crate) async fn bind_passive(ip: Ipv4Addr, ports: &RangeInclusive<u16>) -> io::Result<TcpListener> {
    let span = u32::from(*ports.end()) - u32::from(*ports.start()) + 1;
    let mut last_err = io::Error::other("no bind attempt was made");
    for _ in 0..BIND_RETRIES {
        let mut raw = [0u8; 2];
        getrandom::fill(&mut raw).map_err(io::Error::other)?;
        let offset = u32::from(u16::from_ne_bytes(raw)) % span;
        let port = ports.start() + offset as u16;
        match TcpListener::bind(SocketAddr::from((ip, port))).await {
            Ok(listener) => return Ok(listener),
            Err(err) => last_err = err,
        }
    }
    Err(last_err)
}

/// Turns the session's intent into a live data connection, or fails within
/// [`DATA_CHANNEL_TIMEOUT`].
pub(crate) async fn establish(intent: DataChanIntent) -> io::Result<TcpStream> {
    match intent {
        DataChanIntent::None => Err(io::Error::new(io::ErrorKind::NotConnected, "no PORT or PASV issued")),
        DataChanIntent::Active(addr) => tokio::time::timeout(DATA_CHANNEL_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "data connect timed out"))?,
        DataChanIntent::Passive(listener) => {
            let (socket, _peer) = tokio::time::timeout(DATA_CHANNEL_TIMEOUT, listener.accept())
                .await
                .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "no client connected to the passive port"))??;
            // The listener drops here: one accept per PASV, ever.
            Ok(socket)
        }
    }
}
