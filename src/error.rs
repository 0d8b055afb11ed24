use thiserror::Error;

/// Failure to get any response out of the transport
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Other(String),
}

/// Errors raised by the session-aware client
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    /// Renewal was attempted and failed. The caller must log in again.
    #[error("session expired, please log in again")]
    Expired,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors from typed backend calls
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Batch-level precondition failures, detected before any network call
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("invalid file type: {filename} (allowed: jpg, jpeg, png, heic, pdf)")]
    InvalidFileType { filename: String },
    #[error("file too large: {filename} is {size} bytes, limit is {limit}")]
    FileTooLarge {
        filename: String,
        size: u64,
        limit: u64,
    },
}

/// Errors that abort a whole upload batch
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("upload initialization failed: {0}")]
    Initialization(String),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Receipt collection could not be fetched for analytics
#[derive(Debug, Clone, Error, PartialEq)]
#[error("failed to load analytics: {0}")]
pub struct AnalyticsFetchError(#[from] pub ApiError);
