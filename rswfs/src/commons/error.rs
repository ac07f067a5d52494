use thiserror::Error;

/// Failure kinds of a WFS retrieval
///
/// Transport failures are kept apart from protocol rejections so that callers
/// can decide whether a retry makes sense (see [`WfsError::is_retryable`]).
#[derive(Error, Debug)]
pub enum WfsError {
    #[error("Connection to WFS server failed: {0}")]
    Connectivity(#[from] reqwest::Error),

    #[error("WFS server returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("WFS server rejected the request ({code}): {message}")]
    Protocol { code: String, message: String },

    #[error("WFS server advertises no feature types")]
    NoFeatureTypes,

    #[error("Feature type '{name}' is not advertised by the WFS server")]
    UnknownFeatureType { name: String },

    #[error("Malformed {what}: {message}")]
    MalformedResponse { what: &'static str, message: String },

    #[error("Invalid WFS endpoint '{url}': {message}")]
    InvalidEndpoint { url: String, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WfsError {
    /// True for failures that may go away on a later attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            WfsError::Connectivity(_) => true,
            WfsError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    pub(crate) fn malformed(what: &'static str, message: impl ToString) -> Self {
        WfsError::MalformedResponse {
            what,
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WfsError>;
