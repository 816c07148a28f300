//! In-process host link
//!
//! Connects a planner to a host living in the same process. Tests use it to
//! play the host's side of the handshake.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use crate::protocol::{Inbound, Outbound};

use super::link::{HostConnection, HostError, HostPort, Subscription};

const INBOUND_BUFFER: usize = 64;

struct ChannelPort {
    tx: mpsc::UnboundedSender<Outbound>,
}

#[async_trait]
impl HostPort for ChannelPort {
    async fn post(&self, message: &Outbound) -> Result<(), HostError> {
        debug!(kind = message.kind(), "ChannelPort::post: called");
        self.tx.send(message.clone()).map_err(|_| HostError::Closed)
    }
}

/// The host's end of an in-process link
#[derive(Debug)]
pub struct ChannelHost {
    inbound_tx: mpsc::Sender<Inbound>,
    outbound_rx: mpsc::UnboundedReceiver<Outbound>,
}

impl ChannelHost {
    /// Send a message to the widget
    pub async fn send(&self, message: Inbound) -> Result<(), HostError> {
        debug!(kind = message.kind(), "ChannelHost::send: called");
        self.inbound_tx.send(message).await.map_err(|_| HostError::Closed)
    }

    /// Wait for the next message from the widget
    pub async fn recv(&mut self) -> Option<Outbound> {
        self.outbound_rx.recv().await
    }

    /// Next message from the widget if one is already queued
    pub fn try_recv(&mut self) -> Option<Outbound> {
        self.outbound_rx.try_recv().ok()
    }
}

/// Create a connected widget/host pair
pub fn channel_pair() -> (HostConnection, ChannelHost) {
    debug!("channel_pair: called");
    let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_BUFFER);
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

    let port = Arc::new(ChannelPort { tx: outbound_tx });
    let conn = HostConnection::embedded(port, Subscription::new(inbound_rx, None));
    (
        conn,
        ChannelHost {
            inbound_tx,
            outbound_rx,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostMode;
    use crate::protocol::SavedData;

    #[tokio::test]
    async fn test_channel_pair_both_directions() {
        let (conn, mut host) = channel_pair();
        assert_eq!(conn.mode(), HostMode::Embedded);
        let (_, port, sub) = conn.into_parts();
        let port = port.unwrap();
        let mut sub = sub.unwrap();

        port.post(&Outbound::Ready).await.unwrap();
        assert_eq!(host.recv().await, Some(Outbound::Ready));

        host.send(Inbound::LoadSavedData(SavedData::default())).await.unwrap();
        assert_eq!(sub.recv().await, Some(Inbound::LoadSavedData(SavedData::default())));
    }

    #[tokio::test]
    async fn test_post_after_host_dropped_is_closed() {
        let (conn, host) = channel_pair();
        drop(host);
        let (_, port, _) = conn.into_parts();
        let result = port.unwrap().post(&Outbound::AuthConfirmed).await;
        assert!(matches!(result, Err(HostError::Closed)));
    }
}
