use thiserror::Error;

const MAX_BODY_CHARS: usize = 200;

/// Failure classes for calls to the prediction service.
///
/// Every request-layer failure is converted into one of these at the fetch
/// boundary; none propagate as panics. `Timeout` is split out from `Network`
/// so an unbounded-looking wait can be told apart from a refused connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("http {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response body: {0}")]
    Parse(String),
    #[error("request timed out")]
    Timeout,
}

impl ApiError {
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Parse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        ApiError::Status {
            status: status.as_u16(),
            body: clip_body(body),
        }
    }
}

// Error bodies can be whole HTML pages; keep only enough to diagnose.
fn clip_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_BODY_CHARS {
        return trimmed.to_string();
    }
    trimmed.chars().take(MAX_BODY_CHARS).collect()
}
