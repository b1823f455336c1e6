//! Error types for the request helper and the account client.
//!
//! # Design
//! `send` itself never fails: every round trip ends in a callback with a
//! status code. `RequestFailed` is produced by call sites that inspect that
//! status, and carries whatever body the server (or transport) delivered.

use thiserror::Error;

use crate::http::ResponseBody;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body could not be serialized to JSON.
    #[error("failed to encode request body: {0}")]
    Encoding(#[source] serde_json::Error),

    /// Non-2xx status, or status 0 when the transport never got a response.
    #[error("request failed with status {status}")]
    RequestFailed { status: u16, body: ResponseBody },

    /// A 2xx JSON body did not match the expected type.
    #[error("failed to decode response body: {0}")]
    Decoding(#[source] serde_json::Error),

    /// The completion callback panicked before it could return.
    #[error("completion callback panicked")]
    CallbackPanicked,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}
