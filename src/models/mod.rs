pub mod receipt;
pub mod spend;
pub mod upload;

pub use receipt::{Receipt, ReceiptId, ReceiptStatus};
pub use spend::{BucketKey, SpendBucket, SpendSeries};
pub use upload::{
    FailedUpload, FailureReason, UploadFile, UploadOutcome, UploadTicket, UploadedReceipt,
};
