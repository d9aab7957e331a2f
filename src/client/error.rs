use reqwest::StatusCode;
use thiserror::Error;

/// Describes the various errors that can be returned from the client
#[derive(Error, Debug)]
pub enum ClientError {
    /// Indicates that the given URL is invalid, contains the underlying parsing error
    #[error("Invalid URL given: {0:?}")]
    InvalidURL(#[from] url::ParseError),
    /// Invalid configuration was given to the client
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// IO errors from reading a configuration file
    #[error("Error while performing IO operation: {0:?}")]
    Io(#[from] std::io::Error),
    /// Invalid TOML that can occur when loading a client configuration from disk
    #[error("Invalid toml: {0:?}")]
    InvalidToml(#[from] toml::de::Error),
    /// A request body could not be serialized or a response body could not be parsed as the
    /// expected JSON type
    #[error("Invalid json: {0:?}")]
    InvalidJson(#[from] serde_json::Error),
    /// An identifier can't be used as a path segment (empty, `.` or `..`). Nothing was sent
    #[error("Invalid id: {0}")]
    InvalidId(String),
    /// There was a problem with the http client, such as a connection failure or timeout. Contains
    /// the underlying error, untouched
    #[error("Error sending request: {0:?}")]
    HttpClientError(#[from] reqwest::Error),

    // API errors
    /// The server answered with a status code other than the one the operation expects. Contains
    /// the raw response body so callers can see what the server had to say
    #[error("Unexpected status code {actual} (expected {expected}): {body}")]
    UnexpectedStatusCode {
        expected: StatusCode,
        actual: StatusCode,
        body: String,
    },

    /// A catch-all for uncategorized errors. Contains an error message describing the underlying
    /// issue
    #[error("{0}")]
    Other(String),
}

impl ClientError {
    /// Returns the status code the server actually responded with, if this error came from a
    /// status code mismatch
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            ClientError::UnexpectedStatusCode { actual, .. } => Some(*actual),
            ClientError::HttpClientError(e) => e.status(),
            _ => None,
        }
    }
}
