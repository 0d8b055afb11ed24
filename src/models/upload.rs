use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use super::ReceiptId;

/// A file queued for upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = content_type_for(&filename).to_string();
        Self {
            filename,
            content_type,
            bytes,
        }
    }

    /// Read a file from disk, inferring its content type from the extension
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .context(format!("Not a file path: {:?}", path))?;
        let bytes = tokio::fs::read(path)
            .await
            .context(format!("Failed to read {:?}", path))?;
        Ok(Self::new(filename, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lowercased extension, if any
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.filename)
    }
}

/// Text after the last dot, lowercased. A bare ".jpg" counts as a jpg.
fn extension_of(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
}

/// MIME type for the receipt formats the backend accepts
pub fn content_type_for(filename: &str) -> &'static str {
    let ext = extension_of(filename).unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// One entry of the initialize request body
#[derive(Debug, Clone, Serialize)]
pub struct UploadRequestEntry<'a> {
    pub filename: &'a str,
    pub content_type: &'a str,
}

/// Per-file answer from the initialize phase
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadTicket {
    pub receipt_id: ReceiptId,
    /// Short-lived direct-to-storage write target
    pub presigned_url: String,
    #[serde(default)]
    pub file_key: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Why a file ended up in the failed set
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    Transfer(String),
    Confirm(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transfer(detail) => write!(f, "transfer failed: {}", detail),
            Self::Confirm(detail) => write!(f, "confirm failed: {}", detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadedReceipt {
    pub receipt_id: ReceiptId,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedUpload {
    pub filename: String,
    pub receipt_id: Option<ReceiptId>,
    pub reason: FailureReason,
}

/// Result of one upload batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadOutcome {
    pub succeeded: Vec<UploadedReceipt>,
    pub failed: Vec<FailedUpload>,
}

impl UploadOutcome {
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// e.g. "2 receipts uploaded, 1 failed"
    pub fn summary(&self) -> String {
        let plural = |n: usize| if n == 1 { "receipt" } else { "receipts" };
        let ok = self.succeeded.len();
        if self.failed.is_empty() {
            format!("{} {} uploaded", ok, plural(ok))
        } else {
            format!("{} {} uploaded, {} failed", ok, plural(ok), self.failed.len())
        }
    }
}
