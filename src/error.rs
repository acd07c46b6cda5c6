//! Client error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to marshal request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("API key contains invalid header characters")]
    InvalidApiKey,

    #[error("failed to perform request: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to decode response body: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// HTTP status of a rejected request, if the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}

/// Format an error for display, condensing Google-style JSON error bodies.
///
/// `{"error": {"code": 404, "message": "...", "status": "NOT_FOUND"}}` becomes
/// `HTTP 404: ... (NOT_FOUND)`. Anything else is rendered unchanged.
#[must_use]
pub fn format_api_error(error: &Error) -> String {
    if let Error::Api { status, body } = error
        && let Some(msg) = extract_error_message(body)
    {
        return format!("HTTP {status}: {msg}");
    }
    error.to_string()
}

fn extract_error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    let error_obj = json.get("error")?;

    if let Some(msg) = error_obj.as_str() {
        return Some(msg.to_string());
    }

    let msg = error_obj.get("message").and_then(|v| v.as_str())?;
    match error_obj.get("status").and_then(|v| v.as_str()) {
        Some(status) => Some(format!("{msg} ({status})")),
        None => Some(msg.to_string()),
    }
}
