//! Auth payload delivered by the host
//!
//! Opaque display data. Only a string `email` is read; everything else,
//! including an `email` of any other type, is kept verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct AuthInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthInfo {
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            extra: Map::new(),
        }
    }
}

impl From<Map<String, Value>> for AuthInfo {
    fn from(mut fields: Map<String, Value>) -> Self {
        let email = match fields.remove("email") {
            Some(Value::String(email)) => Some(email),
            Some(other) => {
                debug!(?other, "AuthInfo: email is not a string, keeping it as an extra field");
                fields.insert("email".to_string(), other);
                None
            }
            None => None,
        };
        Self { email, extra: fields }
    }
}
