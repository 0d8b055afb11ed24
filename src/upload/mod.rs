pub mod batch;
pub mod orchestrator;
pub mod validation;

pub use batch::{FileState, UploadBatch};
pub use orchestrator::UploadOrchestrator;
pub use validation::{validate_batch, ALLOWED_EXTENSIONS, MAX_FILE_SIZE};
