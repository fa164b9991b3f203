//! Contains code pertaining to the FTP *control* channel.

pub(crate) mod codec;
pub(crate) mod command;
pub(crate) mod control_loop;
mod error;
pub(crate) mod handler;
pub(crate) mod handlers;
pub(crate) mod parser;
pub(crate) mod reply;

pub(crate) use control_loop::{ControlParams, spawn_loop};
