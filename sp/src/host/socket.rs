//! Unix socket host link
//!
//! The widget connects to a socket the host listens on and keeps the stream
//! open for the life of the widget. Both directions carry newline-delimited
//! JSON envelopes.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use crate::protocol::{Inbound, Outbound, decode_inbound, encode_line};

use super::framing::{Frame, read_frame};
use super::link::{HostConnection, HostError, HostPort, Subscription};

/// Default timeout for connecting to the host
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Inbound messages buffered before the reader waits on the planner
const INBOUND_BUFFER: usize = 64;

/// Outbound half of a socket link
pub struct SocketPort {
    writer: Mutex<OwnedWriteHalf>,
}

#[async_trait]
impl HostPort for SocketPort {
    async fn post(&self, message: &Outbound) -> Result<(), HostError> {
        debug!(kind = message.kind(), "SocketPort::post: called");
        let line = encode_line(message)?;
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Connect to a host listening on `socket_path`
pub async fn connect(socket_path: &Path, timeout: Duration) -> Result<HostConnection, HostError> {
    debug!(?socket_path, ?timeout, "connect: called");
    let stream = tokio::time::timeout(timeout, UnixStream::connect(socket_path))
        .await
        .map_err(|_| HostError::Timeout)??;
    info!(?socket_path, "Connected to host");
    Ok(from_stream(stream))
}

/// Wrap an already-connected stream (for testing)
pub fn from_stream(stream: UnixStream) -> HostConnection {
    debug!("from_stream: called");
    let (read_half, write_half) = stream.into_split();
    let (tx, rx) = mpsc::channel(INBOUND_BUFFER);
    let reader = tokio::spawn(read_loop(read_half, tx));

    let port = Arc::new(SocketPort {
        writer: Mutex::new(write_half),
    });
    HostConnection::embedded(port, Subscription::new(rx, Some(reader)))
}

async fn read_loop(read_half: OwnedReadHalf, tx: mpsc::Sender<Inbound>) {
    debug!("read_loop: started");
    let mut reader = BufReader::new(read_half);
    let mut buf = Vec::new();
    loop {
        let line = match read_frame(&mut reader, &mut buf).await {
            Ok(Frame::Line(line)) => line,
            Ok(Frame::NotText) => {
                warn!("Ignoring host message that is not UTF-8");
                continue;
            }
            Ok(Frame::TooLong(len)) => {
                warn!(len, "Ignoring oversized host message");
                continue;
            }
            Ok(Frame::Eof) => {
                info!("Host closed the connection");
                break;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read from host");
                break;
            }
        };

        match decode_inbound(&line) {
            Ok(Some(message)) => {
                debug!(kind = message.kind(), "read_loop: inbound message");
                if tx.send(message).await.is_err() {
                    debug!("read_loop: subscriber gone, exiting");
                    break;
                }
            }
            Ok(None) => debug!("read_loop: ignoring unrecognized message"),
            Err(e) => warn!(error = %e, "Ignoring malformed host message"),
        }
    }
    debug!("read_loop: exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{MAX_MESSAGE_SIZE, decode_outbound};
    use tempfile::TempDir;
    use tokio::io::AsyncBufReadExt;
    use tokio::net::UnixListener;

    #[tokio::test]
    async fn test_connect_missing_socket_fails() {
        let temp = TempDir::new().unwrap();
        let result = connect(&temp.path().join("nope.sock"), Duration::from_millis(200)).await;
        assert!(matches!(result, Err(HostError::Io(_))));
    }

    #[tokio::test]
    async fn test_post_and_receive_over_socket() {
        let temp = TempDir::new().unwrap();
        let socket_path = temp.path().join("host.sock");
        let listener = UnixListener::bind(&socket_path).unwrap();

        let host = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read_half, mut write_half) = stream.into_split();
            let mut lines = BufReader::new(read_half).lines();

            let line = lines.next_line().await.unwrap().unwrap();
            let msg = decode_outbound(&line).unwrap();
            assert_eq!(msg, Some(Outbound::Ready));

            // Junk and unknown types are skipped by the widget
            write_half.write_all(b"garbage\n").await.unwrap();
            write_half.write_all(b"{\"type\":\"PING\"}\n").await.unwrap();
            write_half
                .write_all(b"{\"type\":\"USER_INFO\",\"data\":{\"email\":\"a@b.com\"}}\n")
                .await
                .unwrap();
        });

        let conn = connect(&socket_path, DEFAULT_CONNECT_TIMEOUT).await.unwrap();
        let (_, port, sub) = conn.into_parts();
        let port = port.unwrap();
        let mut sub = sub.unwrap();

        port.post(&Outbound::Ready).await.unwrap();
        let inbound = sub.recv().await.unwrap();
        assert!(matches!(inbound, Inbound::UserInfo(ref info) if info.auth.email.as_deref() == Some("a@b.com")));

        host.await.unwrap();
        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_bad_lines_do_not_end_the_link() {
        let temp = TempDir::new().unwrap();
        let socket_path = temp.path().join("host.sock");
        let listener = UnixListener::bind(&socket_path).unwrap();

        let host = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (_read_half, mut write_half) = stream.into_split();

            write_half.write_all(b"\xff\xfe\n").await.unwrap();
            let mut oversized = vec![b'x'; MAX_MESSAGE_SIZE + 10];
            oversized.push(b'\n');
            write_half.write_all(&oversized).await.unwrap();
            write_half.write_all(b"{\"type\":\"USER_INFO\"}\n").await.unwrap();
            write_half
                .write_all(b"{\"type\":\"USER_INFO\",\"data\":{\"email\":\"a@b.com\"}}\n")
                .await
                .unwrap();
        });

        let conn = connect(&socket_path, DEFAULT_CONNECT_TIMEOUT).await.unwrap();
        let (_, _port, sub) = conn.into_parts();
        let mut sub = sub.unwrap();

        let first = tokio::time::timeout(Duration::from_secs(5), sub.recv()).await.unwrap();
        assert!(matches!(first, Some(Inbound::UserInfo(ref info)) if info.auth.email.is_none()));
        let second = tokio::time::timeout(Duration::from_secs(5), sub.recv()).await.unwrap();
        assert!(matches!(second, Some(Inbound::UserInfo(ref info)) if info.auth.email.as_deref() == Some("a@b.com")));

        host.await.unwrap();
        assert!(sub.recv().await.is_none());
    }
}
