use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::constants::Method;

/// Error details returned by the backend in place of a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("backend error {code}: {message}")]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

/// RPC envelope.
///
/// Requests carry a fresh `id`; the backend's reply echoes it together with
/// the method and holds either a `payload` or an `error`. The payload stays
/// raw JSON until the caller picks a type for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub method: Method,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Box<RawValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Message {
    /// Builds a request envelope.
    pub fn new<T: Serialize>(
        id: impl Into<String>,
        method: Method,
        payload: Option<&T>,
    ) -> Result<Self, serde_json::Error> {
        let payload = payload
            .map(|p| serde_json::to_string(p).and_then(RawValue::from_string))
            .transpose()?;
        Ok(Self {
            id: id.into(),
            method,
            payload,
            error: None,
        })
    }

    /// Whether this envelope is the reply to `request`.
    pub fn answers(&self, request: &Message) -> bool {
        self.id == request.id && self.method == request.method
    }

    /// Splits a reply into its success envelope or the backend's error.
    pub fn into_result(self) -> Result<Self, RpcError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }

    /// Deserializes the payload, `None` when the reply carried none.
    pub fn parse_payload<T: for<'de> Deserialize<'de>>(
        &self,
    ) -> Result<Option<T>, serde_json::Error> {
        self.payload
            .as_deref()
            .map(|raw| serde_json::from_str(raw.get()))
            .transpose()
    }
}
