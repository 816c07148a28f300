//! Host message protocol
//!
//! Simple JSON-over-newline protocol. Each envelope is a single line of JSON
//! followed by `\n`. Unknown message types are not errors: the decoder reports
//! them as `None` so callers can ignore them.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

pub mod messages;

pub use messages::{INBOUND_KINDS, Inbound, OUTBOUND_KINDS, Outbound, SaveResult, SavedData, UserInfo};

/// Maximum accepted line length
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Errors from encoding or decoding envelopes
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Malformed(String),

    #[error("Message too large: {0} bytes")]
    TooLarge(usize),

    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Just enough of an envelope to read its type
#[derive(Debug, Deserialize)]
struct EnvelopeHead {
    #[serde(rename = "type")]
    kind: String,
}

/// Encode a message as one line, newline included
pub fn encode_line<T: serde::Serialize>(message: &T) -> Result<String, ProtocolError> {
    let mut line = serde_json::to_string(message)?;
    if line.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::TooLarge(line.len()));
    }
    line.push('\n');
    Ok(line)
}

/// Decode a host → widget line
///
/// `Ok(None)` means a well-formed envelope of a type the widget does not handle.
pub fn decode_inbound(line: &str) -> Result<Option<Inbound>, ProtocolError> {
    decode_known(line, INBOUND_KINDS, fill_inbound_payload)
}

/// Decode a widget → host line (used by the host side)
pub fn decode_outbound(line: &str) -> Result<Option<Outbound>, ProtocolError> {
    decode_known(line, OUTBOUND_KINDS, |_, _| {})
}

/// A missing or null payload reads as `{}`. A user-info payload that is not
/// an object is kept under `value` so the auth still arrives.
fn fill_inbound_payload(kind: &str, envelope: &mut Map<String, Value>) {
    let data = envelope.remove("data").unwrap_or(Value::Null);
    let data = match data {
        Value::Null => {
            debug!(%kind, "fill_inbound_payload: no data, using empty payload");
            Value::Object(Map::new())
        }
        Value::Object(_) => data,
        other if kind.ends_with("USER_INFO") => {
            debug!(%kind, "fill_inbound_payload: non-object user info kept as opaque value");
            let mut wrapped = Map::new();
            wrapped.insert("value".to_string(), other);
            Value::Object(wrapped)
        }
        other => other,
    };
    envelope.insert("data".to_string(), data);
}

fn decode_known<T: DeserializeOwned>(
    line: &str,
    known: &[&str],
    fill_payload: fn(&str, &mut Map<String, Value>),
) -> Result<Option<T>, ProtocolError> {
    let line = line.trim();
    if line.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::TooLarge(line.len()));
    }
    if line.is_empty() {
        return Err(ProtocolError::Malformed("empty line".to_string()));
    }

    let mut value: Value = serde_json::from_str(line).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    let head: EnvelopeHead =
        EnvelopeHead::deserialize(&value).map_err(|e| ProtocolError::Malformed(e.to_string()))?;

    if !known.contains(&head.kind.as_str()) {
        debug!(kind = %head.kind, "decode_known: unrecognized message type");
        return Ok(None);
    }

    if let Value::Object(envelope) = &mut value {
        fill_payload(&head.kind, envelope);
    }
    let message = serde_json::from_value(value).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    debug!(kind = %head.kind, "decode_known: decoded message");
    Ok(Some(message))
}
