//! Host message types
//!
//! Every message is an envelope `{"type": "...", "data": {...}}`. Payload-less
//! messages omit `data`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::domain::{AuthInfo, WorkItem};

/// Messages from the widget to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outbound {
    /// Widget finished initializing and wants auth
    #[serde(alias = "STUDY_PLANNER_READY")]
    Ready,

    /// Auth/user info received
    AuthConfirmed,

    /// Please persist this list
    #[serde(alias = "SAVE_STUDY_DATA")]
    SaveData(SavedData),
}

impl Outbound {
    /// Wire name of the message type
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::AuthConfirmed => "AUTH_CONFIRMED",
            Self::SaveData(_) => "SAVE_DATA",
        }
    }
}

/// Messages from the host to the widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Inbound {
    /// Identity plus optionally the previously saved list
    #[serde(alias = "KNACK_USER_INFO")]
    UserInfo(UserInfo),

    /// Fresh copy of saved state
    LoadSavedData(SavedData),

    /// Host acknowledgement of a SAVE_DATA
    SaveResult(SaveResult),
}

impl Inbound {
    /// Wire name of the message type
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserInfo(_) => "USER_INFO",
            Self::LoadSavedData(_) => "LOAD_SAVED_DATA",
            Self::SaveResult(_) => "SAVE_RESULT",
        }
    }
}

/// Wire names the widget understands, including legacy aliases
pub const INBOUND_KINDS: &[&str] = &["USER_INFO", "KNACK_USER_INFO", "LOAD_SAVED_DATA", "SAVE_RESULT"];

/// Wire names the host side understands, including legacy aliases
pub const OUTBOUND_KINDS: &[&str] = &[
    "READY",
    "STUDY_PLANNER_READY",
    "AUTH_CONFIRMED",
    "SAVE_DATA",
    "SAVE_STUDY_DATA",
];

/// The item list as stored by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedData {
    /// Items that cannot be read are skipped rather than failing the list
    #[serde(default, alias = "studyItems", deserialize_with = "lenient_items")]
    pub items: Vec<WorkItem>,
}

impl SavedData {
    pub fn new(items: Vec<WorkItem>) -> Self {
        Self { items }
    }
}

/// USER_INFO payload: auth fields at the top level plus optional saved data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(flatten)]
    pub auth: AuthInfo,

    /// Unreadable saved data is treated as absent; the auth still counts
    #[serde(
        default,
        rename = "userData",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_user_data"
    )]
    pub user_data: Option<SavedData>,
}

/// SAVE_RESULT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResult {
    pub ok: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn lenient_items<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<WorkItem>, D::Error> {
    let values = match Value::deserialize(deserializer)? {
        Value::Array(values) => values,
        Value::Null => return Ok(Vec::new()),
        other => {
            warn!(?other, "Saved items are not a list, ignoring them");
            return Ok(Vec::new());
        }
    };
    Ok(values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<WorkItem>(value) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable saved item");
                None
            }
        })
        .collect())
}

fn lenient_user_data<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<SavedData>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => match serde_json::from_value::<SavedData>(value) {
            Ok(data) => Ok(Some(data)),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable userData");
                Ok(None)
            }
        },
    }
}
