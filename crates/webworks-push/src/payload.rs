//! Push payload extraction

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{PushError, PushResult};

/// A push message delivered to the application through an invocation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    pub id: String,
    pub is_ack_required: bool,
    /// Raw message body
    pub data: Vec<u8>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Result of `extractPushPayload` as returned to JavaScript
///
/// Serializes to `{"valid":false}` or to `{"valid":true, ...payload fields}`.
#[derive(Debug, Serialize)]
pub struct PayloadReport {
    valid: bool,
    #[serde(flatten)]
    payload: Option<PushPayload>,
}

impl PayloadReport {
    pub fn valid(payload: PushPayload) -> Self {
        Self {
            valid: true,
            payload: Some(payload),
        }
    }

    pub fn invalid() -> Self {
        Self {
            valid: false,
            payload: None,
        }
    }

    pub fn from_parsed(payload: Option<PushPayload>) -> Self {
        payload.map_or_else(Self::invalid, Self::valid)
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn payload(&self) -> Option<&PushPayload> {
        self.payload.as_ref()
    }

    pub fn to_json(&self) -> PushResult<String> {
        serde_json::to_string(self).map_err(PushError::Encode)
    }
}

/// Decode the base64 invocation data the application was launched with
///
/// Whitespace (line breaks inserted by the invocation framework) is ignored.
pub fn decode_invoke_data(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD.decode(compact)
}
