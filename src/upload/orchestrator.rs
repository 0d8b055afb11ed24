use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::batch::UploadBatch;
use super::validation::validate_batch;
use crate::backend::{HttpRequest, Method, SessionClient};
use crate::error::{ApiError, SessionError, UploadError};
use crate::models::upload::UploadRequestEntry;
use crate::models::{ReceiptId, UploadFile, UploadOutcome, UploadTicket};

pub const UPLOAD_INIT_PATH: &str = "/receipts/upload/";
pub const UPLOAD_COMPLETE_PATH: &str = "/receipts/complete/";

/// Drives initialize, transfer and confirm for a batch of files
pub struct UploadOrchestrator {
    client: Arc<SessionClient>,
}

impl UploadOrchestrator {
    pub fn new(client: Arc<SessionClient>) -> Self {
        Self { client }
    }

    /// Upload a batch.
    ///
    /// Validation and initialize failures reject the whole batch. Transfer
    /// and confirm failures are recorded per file in the outcome.
    pub async fn upload(&self, files: Vec<UploadFile>) -> Result<UploadOutcome, UploadError> {
        validate_batch(&files)?;

        let mut batch = UploadBatch::new(files);
        if batch.is_empty() {
            return Ok(UploadOutcome::default());
        }

        let tickets = self.initialize(batch.files()).await?;
        batch.initialize(tickets).map_err(UploadError::Initialization)?;
        debug!("Initialized {} uploads", batch.len());

        let results = self.transfer_all(&batch).await;
        for (index, result) in results {
            batch.record_transfer(index, result);
        }

        let confirm_set = batch.confirm_set();
        if !confirm_set.is_empty() {
            match self.confirm(&confirm_set).await {
                Ok(()) => batch.mark_confirmed(),
                Err(reason) => {
                    warn!(
                        "Confirm failed for {} transferred receipts: {}",
                        confirm_set.len(),
                        reason
                    );
                    batch.mark_confirm_failed(&reason);
                }
            }
        }

        let outcome = batch.into_outcome();
        info!("{}", outcome.summary());
        Ok(outcome)
    }

    /// Phase 1: allocate one receipt and one write target per file
    async fn initialize(&self, files: &[UploadFile]) -> Result<Vec<UploadTicket>, UploadError> {
        let entries: Vec<UploadRequestEntry<'_>> = files
            .iter()
            .map(|f| UploadRequestEntry {
                filename: &f.filename,
                content_type: &f.content_type,
            })
            .collect();
        let body = serde_json::json!({ "files": entries });

        let response = match self.client.post_json(UPLOAD_INIT_PATH, &body).await {
            Ok(response) => response,
            Err(ApiError::Session(SessionError::Expired)) => {
                return Err(UploadError::Session(SessionError::Expired))
            }
            Err(e) => return Err(UploadError::Initialization(e.to_string())),
        };

        if !response.is_success() {
            return Err(UploadError::Initialization(format!(
                "backend returned {}",
                response.status
            )));
        }

        let body: serde_json::Value = response
            .json()
            .map_err(|e| UploadError::Initialization(format!("invalid response: {}", e)))?;

        // either {"uploads": [...]} or a bare list
        let uploads = match body {
            serde_json::Value::Object(mut map) => map.remove("uploads").unwrap_or_default(),
            other => other,
        };
        if !uploads.is_array() {
            return Err(UploadError::Initialization(
                "invalid response: missing upload list".to_string(),
            ));
        }

        serde_json::from_value(uploads)
            .map_err(|e| UploadError::Initialization(format!("invalid upload entry: {}", e)))
    }

    /// Phase 2: write every file to its destination concurrently and wait
    /// for all of them
    async fn transfer_all(&self, batch: &UploadBatch) -> Vec<(usize, Result<(), String>)> {
        let transfers = batch
            .pending_transfers()
            .into_iter()
            .map(|(index, file, ticket)| async move {
                let result = self.transfer(file, ticket).await;
                if let Err(ref reason) = result {
                    warn!("Upload of {} failed: {}", file.filename, reason);
                }
                (index, result)
            });

        join_all(transfers).await
    }

    async fn transfer(&self, file: &UploadFile, ticket: &UploadTicket) -> Result<(), String> {
        let request = HttpRequest::new(Method::PUT, ticket.presigned_url.clone())
            .header("Content-Type", file.content_type.clone())
            .body(file.bytes.clone());

        let response = self
            .client
            .transport()
            .send(request)
            .await
            .map_err(|e| e.to_string())?;

        if response.is_success() {
            debug!("Stored {} as receipt {}", file.filename, ticket.receipt_id);
            Ok(())
        } else {
            Err(format!("storage returned {}", response.status))
        }
    }

    /// Phase 3: mark all transferred receipts ready for processing
    async fn confirm(&self, receipt_ids: &[ReceiptId]) -> Result<(), String> {
        let body = serde_json::json!({ "receipt_ids": receipt_ids });

        match self.client.post_json(UPLOAD_COMPLETE_PATH, &body).await {
            Ok(response) if response.is_success() => Ok(()),
            Ok(response) => Err(format!("backend returned {}", response.status)),
            Err(ApiError::Session(SessionError::Expired)) => Err("session expired".to_string()),
            Err(e) => Err(e.to_string()),
        }
    }
}
