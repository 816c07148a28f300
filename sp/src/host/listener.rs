//! Development host
//!
//! A stand-in for the application that embeds the widget. It listens on a Unix
//! socket, answers READY with USER_INFO, and records SAVE_DATA into a JSON file.

use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::{AuthInfo, WorkItem};
use crate::protocol::{Inbound, Outbound, SaveResult, SavedData, UserInfo, decode_outbound, encode_line};

use super::framing::{Frame, read_frame};

/// Settings for the development host
#[derive(Debug, Clone)]
pub struct DevHostConfig {
    /// Email reported in USER_INFO
    pub email: String,
    /// Where saved items are read from and written to
    pub data_file: Option<PathBuf>,
    /// Answer every save with a failed SAVE_RESULT
    pub reject_saves: bool,
}

impl Default for DevHostConfig {
    fn default() -> Self {
        Self {
            email: "student@example.com".to_string(),
            data_file: None,
            reject_saves: false,
        }
    }
}

/// Something the development host did, for display
#[derive(Debug, Clone, PartialEq)]
pub enum HostActivity {
    Connected,
    Received(String),
    SentUserInfo { items: usize },
    Saved { items: usize },
    SaveRejected { reason: String },
    Disconnected,
}

/// Create and bind a Unix Domain Socket listener for the host
///
/// Handles cleanup of stale socket files from previous runs.
pub fn create_listener_at(socket_path: &Path) -> Result<UnixListener> {
    debug!(?socket_path, "create_listener_at: creating host socket");

    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create socket directory")?;
    }

    if socket_path.exists() {
        debug!(?socket_path, "create_listener_at: removing stale socket");
        std::fs::remove_file(socket_path).context("Failed to remove stale socket")?;
    }

    let listener = UnixListener::bind(socket_path).context("Failed to bind host socket")?;
    debug!(?socket_path, "create_listener_at: socket bound successfully");
    Ok(listener)
}

/// Remove the socket file on shutdown
pub fn cleanup_socket(socket_path: &Path) {
    if socket_path.exists() {
        debug!(?socket_path, "cleanup_socket: removing socket file");
        if let Err(e) = std::fs::remove_file(socket_path) {
            warn!(?socket_path, error = %e, "Failed to remove socket file");
        }
    }
}

/// Read previously saved items, empty if the file does not exist yet
pub fn load_items(data_file: &Path) -> Result<Vec<WorkItem>> {
    debug!(?data_file, "load_items: called");
    if !data_file.exists() {
        debug!("load_items: no data file yet");
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(data_file).context("Failed to read data file")?;
    let data: SavedData = serde_json::from_str(&content).context("Failed to parse data file")?;
    Ok(data.items)
}

/// Write items as the data file
pub fn store_items(data_file: &Path, items: &[WorkItem]) -> Result<()> {
    debug!(?data_file, count = items.len(), "store_items: called");
    let data = SavedData::new(items.to_vec());
    let content = serde_json::to_string_pretty(&data).context("Failed to serialize items")?;
    std::fs::write(data_file, content).context("Failed to write data file")?;
    Ok(())
}

/// Accept widget connections until `shutdown` resolves
///
/// Connections are served one after another; a widget owns its host for as
/// long as it is mounted.
pub async fn serve(
    listener: UnixListener,
    config: DevHostConfig,
    activity: Option<mpsc::UnboundedSender<HostActivity>>,
    shutdown: impl std::future::Future<Output = ()>,
) -> Result<()> {
    debug!(?config, "serve: called");
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, _) = accepted.context("Failed to accept widget connection")?;
                info!("Widget connected");
                report(&activity, HostActivity::Connected);
                if let Err(e) = handle_connection(stream, &config, &activity).await {
                    warn!(error = %e, "Widget connection ended with error");
                }
                report(&activity, HostActivity::Disconnected);
            }
            _ = &mut shutdown => {
                info!("Development host shutting down");
                break;
            }
        }
    }
    Ok(())
}

fn report(activity: &Option<mpsc::UnboundedSender<HostActivity>>, event: HostActivity) {
    if let Some(tx) = activity {
        let _ = tx.send(event);
    }
}

async fn handle_connection(
    stream: UnixStream,
    config: &DevHostConfig,
    activity: &Option<mpsc::UnboundedSender<HostActivity>>,
) -> Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut buf = Vec::new();

    loop {
        let line = match read_frame(&mut reader, &mut buf)
            .await
            .context("Failed to read widget message")?
        {
            Frame::Line(line) => line,
            Frame::NotText => {
                warn!("Ignoring widget message that is not UTF-8");
                continue;
            }
            Frame::TooLong(len) => {
                warn!(len, "Ignoring oversized widget message");
                continue;
            }
            Frame::Eof => break,
        };
        let message = match decode_outbound(&line) {
            Ok(Some(message)) => message,
            Ok(None) => {
                debug!(%line, "handle_connection: ignoring unrecognized message");
                continue;
            }
            Err(e) => {
                warn!(error = %e, "Ignoring malformed widget message");
                continue;
            }
        };
        report(activity, HostActivity::Received(message.kind().to_string()));

        if let Some(reply) = respond(message, config, activity) {
            let line = encode_line(&reply).context("Failed to encode reply")?;
            write_half
                .write_all(line.as_bytes())
                .await
                .context("Failed to write reply")?;
            write_half.flush().await.context("Failed to flush reply")?;
        }
    }
    info!("Widget disconnected");
    Ok(())
}

/// Decide the host's reply to one widget message
fn respond(
    message: Outbound,
    config: &DevHostConfig,
    activity: &Option<mpsc::UnboundedSender<HostActivity>>,
) -> Option<Inbound> {
    match message {
        Outbound::Ready => {
            let items = match &config.data_file {
                Some(path) => load_items(path).unwrap_or_else(|e| {
                    warn!(error = %e, "Could not load saved items, starting empty");
                    Vec::new()
                }),
                None => Vec::new(),
            };
            report(activity, HostActivity::SentUserInfo { items: items.len() });
            Some(Inbound::UserInfo(UserInfo {
                auth: AuthInfo::with_email(config.email.clone()),
                user_data: Some(SavedData::new(items)),
            }))
        }
        Outbound::AuthConfirmed => {
            info!("Widget confirmed auth");
            None
        }
        Outbound::SaveData(data) => {
            if config.reject_saves {
                let reason = "saving is disabled on this host".to_string();
                report(activity, HostActivity::SaveRejected { reason: reason.clone() });
                return Some(Inbound::SaveResult(SaveResult {
                    ok: false,
                    message: Some(reason),
                }));
            }

            let stored = match &config.data_file {
                Some(path) => store_items(path, &data.items),
                None => Ok(()),
            };
            match stored {
                Ok(()) => {
                    info!(count = data.items.len(), "Saved items");
                    report(activity, HostActivity::Saved { items: data.items.len() });
                    Some(Inbound::SaveResult(SaveResult { ok: true, message: None }))
                }
                Err(e) => {
                    warn!(error = %e, "Failed to save items");
                    let reason = e.to_string();
                    report(activity, HostActivity::SaveRejected { reason: reason.clone() });
                    Some(Inbound::SaveResult(SaveResult {
                        ok: false,
                        message: Some(reason),
                    }))
                }
            }
        }
    }
}
