//! Errors returned by the Send API client.

use serde::Deserialize;

/// Structured error returned by the Graph API in a non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, thiserror::Error)]
#[error("messenger api error {code}: {message}")]
pub struct MessengerError {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    pub code: i64,
    #[serde(default, rename = "error_subcode", alias = "subcode")]
    pub subcode: Option<i64>,
    #[serde(default)]
    pub fbtrace_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// The call was rejected locally before any request was made.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Platform(#[from] MessengerError),
    /// Non-2xx response without the expected `error` object.
    #[error("unexpected messenger api response: {0}")]
    Protocol(String),
    /// Transport failure. The wrapped error has its URL stripped; the URL carries the access token.
    #[error("messenger request failed")]
    Request(#[source] reqwest::Error),
    #[error("decoding messenger response failed")]
    Decode(#[from] serde_json::Error),
    #[error("staging attachment failed")]
    Staging(#[from] std::io::Error),
    #[error("publicAttachmentUrl is not configured")]
    MissingPublicUrl,
}

impl SendError {
    /// Platform error code, if the API rejected the request.
    pub fn platform_code(&self) -> Option<i64> {
        match self {
            SendError::Platform(e) => Some(e.code),
            _ => None,
        }
    }
}
