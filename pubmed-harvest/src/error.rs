use std::result;

use thiserror::Error;

/// Error types for PubMed retrieval operations
#[derive(Error, Debug)]
pub enum PubMedError {
    /// HTTP request failed (connection error or timeout)
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// XML parsing failed
    #[error("XML parsing failed: {0}")]
    XmlError(String),

    /// Response decoded but lacks the fields a search answer must carry
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// Generic API error with HTTP status code
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// Date window bounds are out of range or inverted
    #[error("Invalid date window: {message}")]
    InvalidDateWindow { message: String },

    /// Invalid PMID format
    #[error("Invalid PMID format: {pmid}")]
    InvalidPmid { pmid: String },

    /// Batch size of zero requested
    #[error("Batch size must be greater than zero")]
    InvalidBatchSize,
}

pub type Result<T> = result::Result<T, PubMedError>;

impl PubMedError {
    /// Whether the error came from the transport layer (network or HTTP status)
    ///
    /// An `ApiError` with status 200 is an error the server reported inside
    /// a successful response, so it does not count.
    pub fn is_transport(&self) -> bool {
        match self {
            PubMedError::RequestError(_) => true,
            PubMedError::ApiError { status, .. } => *status != 200,
            _ => false,
        }
    }

    /// Whether the server answered with something we could not interpret
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            PubMedError::JsonError(_)
                | PubMedError::XmlError(_)
                | PubMedError::MalformedResponse { .. }
        )
    }
}
