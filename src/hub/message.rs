use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::connection::UserIdentity;

/// Wire envelope relayed by the hub.
///
/// The hub never looks inside; this type only exists for frames the server
/// itself originates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

impl Message {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    pub fn user_joined(identity: &UserIdentity) -> Self {
        Self::new("user_joined", presence_payload(identity))
    }

    pub fn user_left(identity: &UserIdentity) -> Self {
        Self::new("user_left", presence_payload(identity))
    }

    pub fn to_bytes(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }
}

fn presence_payload(identity: &UserIdentity) -> Value {
    serde_json::json!({
        "user_id": identity.user_id,
        "username": identity.username,
    })
}
