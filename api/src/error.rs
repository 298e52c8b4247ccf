use std::{fmt::Display, str::FromStr, time::Duration};

use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

pub const UNEXPECTED_RESPONSE: &str = "Unexpected API response";

/// `code` field of the response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseCode {
    Success,
    Other(String),
}

impl FromStr for ResponseCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUCCESS" => Ok(Self::Success),
            other => Ok(Self::Other(other.to_owned())),
        }
    }
}

impl Display for ResponseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Success => "SUCCESS",
            Self::Other(code) => code,
        })?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response reached us.
    Transport,
    /// The server answered and said no.
    Application,
    /// The server answered with something that is not an envelope we understand.
    Decode,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{context}: {source}")]
    Transport {
        context: &'static str,
        source: reqwest::Error,
    },
    #[error("{context}: no response within {timeout:?}")]
    Timeout {
        context: &'static str,
        timeout: Duration,
    },
    #[error("{message}")]
    Rejected {
        code: Option<ResponseCode>,
        message: String,
    },
    #[error("{host:?} is not a usable API host: {detail}")]
    InvalidApiHost { host: String, detail: String },
    #[error("{context}: unexpected API response ({detail})")]
    UnexpectedResponse {
        context: &'static str,
        detail: String,
    },
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } | Self::Timeout { .. } | Self::InvalidApiHost { .. } => {
                ErrorKind::Transport
            }
            Self::Rejected { .. } => ErrorKind::Application,
            Self::UnexpectedResponse { .. } => ErrorKind::Decode,
        }
    }

    /// Text for a toast or alert: the server's own message where there is one,
    /// the operation's generic fallback otherwise.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { context, .. } | Self::Timeout { context, .. } => (*context).to_owned(),
            Self::Rejected { message, .. } => message.clone(),
            Self::InvalidApiHost { .. } => self.to_string(),
            Self::UnexpectedResponse { .. } => UNEXPECTED_RESPONSE.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_codes() {
        assert_eq!("SUCCESS".parse::<ResponseCode>().unwrap(), ResponseCode::Success);
        let other: ResponseCode = "VALIDATION_ERROR".parse().unwrap();
        assert_eq!(other, ResponseCode::Other("VALIDATION_ERROR".to_owned()));
        assert_eq!(other.to_string(), "VALIDATION_ERROR");
        assert_eq!("success".parse::<ResponseCode>().unwrap().to_string(), "success");
    }

    #[test]
    fn user_messages_follow_taxonomy() {
        let timeout = ApiError::Timeout { context: "Login failed", timeout: Duration::from_secs(1) };
        assert_eq!(timeout.kind(), ErrorKind::Transport);
        assert_eq!(timeout.user_message(), "Login failed");

        let rejected = ApiError::Rejected { code: None, message: "Wrong password".to_owned() };
        assert_eq!(rejected.kind(), ErrorKind::Application);
        assert_eq!(rejected.user_message(), "Wrong password");

        let decode = ApiError::UnexpectedResponse { context: "Login failed", detail: "eof".to_owned() };
        assert_eq!(decode.kind(), ErrorKind::Decode);
        assert_eq!(decode.user_message(), UNEXPECTED_RESPONSE);
    }
}
