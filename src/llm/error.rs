use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;

/// Why a generation call produced no usable reply.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Backend unreachable or reporting itself unavailable
    #[error("Generation backend unavailable: {0}")]
    Unavailable(String),

    /// Backend refused the input (too long, invalid parameters, ...)
    #[error("Generation request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Any other non-success answer from the backend
    #[error("Generation backend returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Generation timed out after {:.1}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// Output could not be decoded into turns
    #[error("Malformed generation output: {0}")]
    MalformedOutput(String),

    /// Output decoded but holds no assistant turn
    #[error("Generation output contains no assistant reply")]
    MissingAssistantReply,
}

impl GenerationError {
    /// HTTP status used when failures are reported by status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Rejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Upstream { .. } | Self::MalformedOutput(_) | Self::MissingAssistantReply => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    /// Classify a non-success backend status.
    pub(crate) fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        let code = status.as_u16();
        if status == reqwest::StatusCode::SERVICE_UNAVAILABLE
            || status == reqwest::StatusCode::NOT_FOUND
        {
            Self::Unavailable(format!("{}: {}", code, truncate(&body, 500)))
        } else if matches!(code, 400 | 413 | 422) {
            Self::Rejected {
                status: code,
                message: truncate(&body, 500),
            }
        } else {
            Self::Upstream {
                status: code,
                body: truncate(&body, 500),
            }
        }
    }

    /// Classify a transport-level failure.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Unavailable(format!("request timed out: {}", err))
        } else if err.is_decode() {
            Self::MalformedOutput(err.to_string())
        } else {
            Self::Unavailable(err.to_string())
        }
    }
}

/// Truncate a backend body for error messages.
fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}... [truncated]", &s[..idx]),
        None => s.to_string(),
    }
}
