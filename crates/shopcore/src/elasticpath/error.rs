use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by the Elasticpath client.
///
/// The dispatcher only cares whether a failure was caused by the request
/// (`Client`, worth asking the user to retry with different input) or by
/// the service (`Server` and transport problems, worth a "try later").
#[derive(Debug, Error)]
pub enum CommerceError {
    /// 4xx response caused by the request itself
    #[error("Elasticpath rejected the request ({status}): {detail}")]
    Client { status: u16, detail: String },

    /// 5xx response, or a 4xx that says nothing about the request:
    /// rejected credentials, request timeout, rate limiting
    #[error("Elasticpath server error ({status}): {detail}")]
    Server { status: u16, detail: String },

    /// Connection, timeout or TLS failure
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not have the expected shape
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL cannot be extended with a path
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

impl CommerceError {
    /// True when the request itself was at fault (bad product id, invalid e-mail, ...).
    pub fn is_client_error(&self) -> bool {
        matches!(self, CommerceError::Client { .. })
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            CommerceError::Client { status, .. } | CommerceError::Server { status, .. } => Some(*status),
            CommerceError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// 4xx statuses that come from the service side of the exchange.
fn is_service_side(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::UNAUTHORIZED | StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS
    )
}

/// Builds the error for a non-success status.
pub(crate) fn from_status(status: StatusCode, body: &str) -> CommerceError {
    let detail = error_detail(body).unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
    if status.is_client_error() && !is_service_side(status) {
        CommerceError::Client {
            status: status.as_u16(),
            detail,
        }
    } else {
        CommerceError::Server {
            status: status.as_u16(),
            detail,
        }
    }
}

/// Pulls the first `detail` (or `title`) out of a JSON:API error document.
fn error_detail(body: &str) -> Option<String> {
    let document: serde_json::Value = serde_json::from_str(body).ok()?;
    let first = document.get("errors")?.as_array()?.first()?;
    first
        .get("detail")
        .or_else(|| first.get("title"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}
