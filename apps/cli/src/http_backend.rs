//! HTTP transport implementing `BackendConnection`.
//!
//! Every call POSTs one request envelope as JSON to `{backend_url}/rpc`
//! and expects the reply envelope in the response body.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use ledgerdrive_file_manager::{BackendConnection, FileManagerError};
use ledgerdrive_protocol::{Message, Method};
use tracing::debug;

/// Header carrying the caller's principal.
pub const PRINCIPAL_HEADER: &str = "x-ledgerdrive-principal";

pub struct HttpBackend {
    client: reqwest::Client,
    rpc_url: String,
    principal: String,
}

impl HttpBackend {
    pub fn new(backend_url: &str, principal: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            rpc_url: rpc_url(backend_url),
            principal: principal.to_string(),
        })
    }
}

impl BackendConnection for HttpBackend {
    fn call(
        &self,
        method: Method,
        payload: &serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = Result<Message, FileManagerError>> + Send + '_>> {
        let request = request_envelope(method, payload);
        Box::pin(async move {
            let request = request?;
            debug!(id = %request.id, %method, "sending rpc request");

            let response = self
                .client
                .post(&self.rpc_url)
                .header(PRINCIPAL_HEADER, &self.principal)
                .json(&request)
                .send()
                .await
                .map_err(|e| FileManagerError::Transport(format!("{method} request failed: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FileManagerError::Transport(format!(
                    "{method} returned status {status}"
                )));
            }

            let body = response.bytes().await.map_err(|e| {
                FileManagerError::Transport(format!("failed to read {method} reply: {e}"))
            })?;
            parse_reply(&request, &body)
        })
    }

    fn principal(&self) -> &str {
        &self.principal
    }
}

fn rpc_url(backend_url: &str) -> String {
    format!("{}/rpc", backend_url.trim_end_matches('/'))
}

fn request_envelope(method: Method, payload: &serde_json::Value) -> Result<Message, FileManagerError> {
    Ok(Message::new(
        uuid::Uuid::new_v4().to_string(),
        method,
        Some(payload),
    )?)
}

/// Parses a reply body and checks it answers `request`.
fn parse_reply(request: &Message, body: &[u8]) -> Result<Message, FileManagerError> {
    let reply: Message = serde_json::from_slice(body)?;
    if !reply.answers(request) {
        return Err(FileManagerError::Transport(format!(
            "reply {} ({}) does not answer request {} ({})",
            reply.id, reply.method, request.id, request.method
        )));
    }
    Ok(reply)
}
