use serde::Deserialize;
use thiserror::Error;

/// Errors returned by the SLS log store client
#[derive(Debug, Error)]
pub enum SlsError {
    #[error("Invalid SLS endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Log time {seconds}s does not fit the SLS 32-bit time field")]
    TimeOutOfRange { seconds: u64 },

    #[error("SLS transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("SLS rejected request ({status}) {code}: {message} [request id: {request_id}]")]
    Server {
        status: u16,
        code: String,
        message: String,
        request_id: String,
    },
}

/// Error body SLS attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(rename = "errorCode")]
    pub error_code: String,
    #[serde(rename = "errorMessage")]
    pub error_message: String,
}

impl SlsError {
    /// Build a server error from a non-2xx response body.
    ///
    /// Bodies that are not the usual JSON error document are kept verbatim.
    pub(crate) fn from_response(status: u16, request_id: String, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => SlsError::Server {
                status,
                code: parsed.error_code,
                message: parsed.error_message,
                request_id,
            },
            Err(_) => SlsError::Server {
                status,
                code: "UnknownError".to_string(),
                message: body.to_string(),
                request_id,
            },
        }
    }
}
