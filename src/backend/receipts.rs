use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

use super::client::SessionClient;
use super::transport::HttpResponse;
use crate::error::ApiError;
use crate::models::{Receipt, ReceiptId};

pub const RECEIPTS_PATH: &str = "/receipts/";
pub const ANALYTICS_PATH: &str = "/receipts/analytics/";
pub const AI_QUERY_PATH: &str = "/ai/query/";

#[derive(Debug, Deserialize)]
struct ViewUrlResponse {
    url: String,
}

#[derive(Debug, Deserialize)]
struct AnswerResponse {
    answer: serde_json::Value,
}

/// Typed access to the receipt endpoints
#[derive(Clone)]
pub struct ReceiptApi {
    client: Arc<SessionClient>,
}

impl ReceiptApi {
    pub fn new(client: Arc<SessionClient>) -> Self {
        Self { client }
    }

    /// All receipts of the current user, newest first
    pub async fn list_receipts(&self) -> Result<Vec<Receipt>, ApiError> {
        let response = self.client.get(RECEIPTS_PATH).await?;
        decode(&response)
    }

    pub async fn receipt(&self, id: ReceiptId) -> Result<Receipt, ApiError> {
        let response = self.client.get(&format!("/receipts/{}/", id)).await?;
        decode(&response)
    }

    /// Receipt collection consumed by spend analytics
    pub async fn analytics_receipts(&self) -> Result<Vec<Receipt>, ApiError> {
        let response = self.client.get(ANALYTICS_PATH).await?;
        decode(&response)
    }

    /// Short-lived read URL for a receipt image. `None` while the file is not
    /// available yet.
    pub async fn view_url(&self, id: ReceiptId) -> Result<Option<String>, ApiError> {
        let response = self.client.get(&format!("/receipts/{}/view-url/", id)).await?;
        if response.status == 404 {
            return Ok(None);
        }
        let body: ViewUrlResponse = decode(&response)?;
        Ok(Some(body.url))
    }

    /// Ask a natural-language question about the user's spending
    pub async fn ask(&self, query: &str) -> Result<String, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::InvalidRequest("query is empty".to_string()));
        }

        let response = self
            .client
            .post_json(AI_QUERY_PATH, &serde_json::json!({ "query": query }))
            .await?;
        let body: AnswerResponse = decode(&response)?;
        match body.answer {
            serde_json::Value::String(answer) => Ok(answer),
            other => Err(ApiError::InvalidResponse(format!(
                "answer is not a string: {}",
                other
            ))),
        }
    }
}

/// Check status then decode the JSON body
fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    if !response.is_success() {
        return Err(ApiError::Status {
            status: response.status,
            body: response.text(),
        });
    }
    response
        .json()
        .map_err(|e| ApiError::InvalidResponse(e.to_string()))
}
