//! Contains the [`Server`](crate::Server) struct that is used to configure and
//! control an FTP server instance, along with everything that runs a single
//! client session.

mod chancomms;
pub(crate) mod controlchan;
mod datachan;
pub(crate) mod ftpserver;
mod session;
pub(crate) mod shutdown;
