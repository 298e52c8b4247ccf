use reqwest::StatusCode;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, ApiResult, ResponseCode};

/// Uniform wrapper around every response body.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub code: Option<String>,
    /// Older endpoints report failure as `{"status": "failed", "message": ...}`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "data")]
    pub response: Option<Value>,
    #[serde(default)]
    pub errors: Vec<Value>,
}

impl Envelope {
    pub fn response_code(&self) -> Option<ResponseCode> {
        self.code.as_deref().and_then(|code| code.parse().ok())
    }

    fn message_or(&self, fallback: &str) -> String {
        self.message
            .as_deref()
            .filter(|message| !message.trim().is_empty())
            .unwrap_or(fallback)
            .to_owned()
    }
}

/// Turns an HTTP status and body into the payload under `response`.
///
/// Only `code: "SUCCESS"` counts as success, whatever the HTTP status says.
/// `context` doubles as the fallback message shown when the server gives none.
pub fn decode_response<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
    context: &'static str,
) -> ApiResult<T> {
    let envelope = serde_json::from_str::<Envelope>(body);

    if !status.is_success() {
        debug!("{context}: HTTP {status}");
        return Err(match envelope {
            Ok(envelope) => ApiError::Rejected {
                code: envelope.response_code(),
                message: envelope.message_or(context),
            },
            Err(_) => ApiError::Rejected { code: None, message: context.to_owned() },
        });
    }

    let envelope = envelope.map_err(|err| ApiError::UnexpectedResponse {
        context,
        detail: err.to_string(),
    })?;

    match envelope.response_code() {
        Some(ResponseCode::Success) => {
            let payload = envelope.response.unwrap_or(Value::Null);
            serde_json::from_value(payload).map_err(|err| ApiError::UnexpectedResponse {
                context,
                detail: err.to_string(),
            })
        }
        Some(code) => Err(ApiError::Rejected {
            message: envelope.message_or(context),
            code: Some(code),
        }),
        None if envelope.status.as_deref() == Some("failed") => Err(ApiError::Rejected {
            code: None,
            message: envelope.message_or(context),
        }),
        None => Err(ApiError::UnexpectedResponse {
            context,
            detail: "envelope has no `code`".to_owned(),
        }),
    }
}
