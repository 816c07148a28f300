//! Host communication
//!
//! The widget runs inside a host application and talks to it with typed
//! envelopes. This module provides the link abstraction plus two transports:
//! a Unix Domain Socket for real hosts and an in-process channel. It also
//! ships a development host that plays the host's side over the socket.

use std::path::PathBuf;

pub mod channel;
pub mod framing;
pub mod link;
pub mod listener;
pub mod socket;

pub use channel::{ChannelHost, channel_pair};
pub use link::{HostConnection, HostError, HostMode, HostPort, Subscription};
pub use listener::{DevHostConfig, HostActivity};

/// Default socket path for the host link
pub fn default_socket_path() -> PathBuf {
    dirs::runtime_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("studyplanner")
        .join("host.sock")
}
