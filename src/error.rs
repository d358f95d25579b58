use thiserror::Error;

/// Maximum characters to include in error message body for debugging.
pub(crate) const MAX_ERROR_BODY_CHARS: usize = 200;

/// Errors that can occur when talking to the product API.
#[derive(Debug, Error)]
pub enum AsinError {
    /// HTTP/network layer error from reqwest.
    #[error("HTTP request failed: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Non-200 response whose body is not a recognisable API error document.
    #[error("request failed with response-code='{status}': {body}")]
    Http { status: u16, body: String },

    /// The service answered with an `<Error>` document.
    #[error("API error (status {status}): [{code}] {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// Missing or invalid configuration, e.g. an empty secret or access key.
    #[error("config error: {0}")]
    Config(String),

    /// Credential not found or invalid.
    #[error("credential error: {0}")]
    Credential(String),

    /// Signature computation error.
    #[error("signature error: {0}")]
    Signature(String),

    /// Malformed XML in the response body.
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Well-formed XML that lacks the element an operation expects.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl AsinError {
    /// Returns `true` if the error is potentially recoverable by retrying.
    ///
    /// The client never retries on its own; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        match self {
            AsinError::HttpClient(e) => e.is_timeout() || e.is_connect(),
            AsinError::Http { status, .. } => *status >= 500,
            AsinError::Api { status, code, .. } => {
                *status == 503
                    || code == "RequestThrottled"
                    || code.starts_with("AWS.InternalError")
            }
            AsinError::Config(_)
            | AsinError::Credential(_)
            | AsinError::Signature(_)
            | AsinError::Xml(_)
            | AsinError::UnexpectedResponse(_) => false,
        }
    }

    /// Returns the HTTP status if the service answered with a non-200 response.
    pub fn status(&self) -> Option<u16> {
        match self {
            AsinError::Http { status, .. } | AsinError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the error code if this is an API error.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            AsinError::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// A specialized Result type for product API operations.
pub type Result<T> = std::result::Result<T, AsinError>;

/// Truncates a string to at most `max_chars` characters on a valid UTF-8 boundary.
pub(crate) fn truncate_str(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
