pub mod analytics;
pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod upload;

pub use backend::{ReceiptApi, SessionClient};
pub use config::ClientConfig;
pub use error::{
    AnalyticsFetchError, ApiError, SessionError, TransportError, UploadError, ValidationError,
};
pub use upload::UploadOrchestrator;
