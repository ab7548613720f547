use thiserror::Error;

/// Failures that stop a request before any token reaches the caller.
///
/// Problems local to one URL or one stream frame never show up here: they are
/// absorbed into inline content or skipped.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Backend rejected the request with status {status}: {body}")]
    BackendRejected { status: u16, body: String },

    #[error("Could not reach backend {endpoint}: {reason}")]
    BackendUnavailable { endpoint: String, reason: String },

    #[error("Malformed request: {0}")]
    RequestMalformed(String),

    #[error("Failed to render system prompt: {0}")]
    Prompt(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Status code the inbound caller should see for this failure.
    ///
    /// Backend rejections keep the backend's own status; everything else that
    /// happens before streaming is reported as a generic 400, except prompt
    /// rendering which is our own fault.
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::BackendRejected { status, .. } => *status,
            RelayError::Prompt(_) | RelayError::Internal(_) => 500,
            RelayError::BackendUnavailable { .. } | RelayError::RequestMalformed(_) => 400,
        }
    }
}

pub type RelayResult<T> = Result<T, RelayError>;
