//! Backend connection trait.
//!
//! `BackendConnection` is implemented by the application to carry RPC
//! messages over whatever transport reaches the backend.

use std::future::Future;
use std::pin::Pin;

use ledgerdrive_protocol::{Message, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::FileManagerError;

/// Abstract RPC connection to the backend.
///
/// Keeping the transport behind a trait lets the upload pipeline be
/// driven by mocks in tests.
pub trait BackendConnection: Send + Sync {
    /// Sends a request and waits for the reply envelope.
    fn call(
        &self,
        method: Method,
        payload: &serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = Result<Message, FileManagerError>> + Send + '_>>;

    /// Returns the principal the connection authenticates as.
    fn principal(&self) -> &str;
}

/// Sends a request and fails on an error reply.
pub(crate) async fn send(
    conn: &dyn BackendConnection,
    method: Method,
    payload: &impl Serialize,
) -> Result<Message, FileManagerError> {
    let payload = serde_json::to_value(payload)?;
    conn.call(method, &payload)
        .await?
        .into_result()
        .map_err(|err| FileManagerError::Backend {
            code: err.code,
            message: err.message,
        })
}

/// Sends a request and parses the reply payload.
pub(crate) async fn request<T: DeserializeOwned>(
    conn: &dyn BackendConnection,
    method: Method,
    payload: &impl Serialize,
) -> Result<T, FileManagerError> {
    send(conn, method, payload)
        .await?
        .parse_payload::<T>()?
        .ok_or(FileManagerError::EmptyResponse(method))
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use ledgerdrive_protocol::Metadata;

    #[tokio::test]
    async fn request_parses_payload() {
        let mock = MockBackend::new(|method, _| {
            reply(
                method,
                &Metadata {
                    file_count: 4,
                    ..Metadata::default()
                },
            )
        });
        let meta: Metadata = request(&mock, Method::GetMetadata, &serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(meta.file_count, 4);
    }

    #[tokio::test]
    async fn error_reply_becomes_backend_error() {
        let mock = MockBackend::new(|method, _| fail(method, 403, "denied"));
        let err = send(&mock, Method::DeleteAsset, &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FileManagerError::Backend { code: 403, ref message } if message == "denied"
        ));
    }

    #[tokio::test]
    async fn missing_payload_is_empty_response() {
        let mock = MockBackend::new(|method, _| ok(method));
        let err = request::<Metadata>(&mock, Method::GetMetadata, &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FileManagerError::EmptyResponse(Method::GetMetadata)
        ));
    }
}
