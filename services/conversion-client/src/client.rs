//! Conversion Backend Client
//!
//! Typed wrapper around the external eBOM to mBOM conversion service. Every
//! endpoint answers with an `ApiResponse` envelope; this client unwraps it and
//! maps transport and envelope failures onto `BomForgeError`.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use bomforge_models::{
    ApiResponse, BomData, BomSnapshot, ConversionStarted, ConversionStatus, FeedbackRequest, HistoryPage,
    SaveEditsRequest, UploadReceipt,
};
use bomforge_utils::{
    validate_file_size, validate_file_type, validate_handle, validate_model, BackendConfig, BomForgeError, BomForgeResult,
};

/// Multipart field the backend reads the uploaded BOM from
pub const UPLOAD_FIELD: &str = "bomFile";

#[derive(Debug, Clone)]
pub struct ConversionClient {
    client: Client,
    base_url: String,
    allowed_extensions: Vec<String>,
    max_upload_size: u64,
}

impl ConversionClient {
    pub fn new(config: &BackendConfig) -> BomForgeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| BomForgeError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: format!("{}/api", config.api_url.trim_end_matches('/')),
            allowed_extensions: config.allowed_extensions.clone(),
            max_upload_size: config.max_upload_size,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Upload a BOM spreadsheet. Type and size are checked before sending.
    pub async fn upload_bom_file(&self, file_name: &str, bytes: Vec<u8>) -> BomForgeResult<UploadReceipt> {
        validate_file_type(file_name, &self.allowed_extensions)?;
        validate_file_size(bytes.len() as u64, self.max_upload_size)?;

        info!(file_name, size = bytes.len(), "Uploading BOM file");
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part(UPLOAD_FIELD, part);

        self.fetch(self.client.post(self.url("/upload")).multipart(form), "upload")
            .await
    }

    pub async fn start_conversion(&self, upload_id: &str) -> BomForgeResult<ConversionStarted> {
        validate_handle("upload_id", upload_id)?;
        let body = serde_json::json!({ "uploadId": upload_id });
        self.fetch(self.client.post(self.url("/convert")).json(&body), "conversion")
            .await
    }

    pub async fn get_conversion_status(&self, conversion_id: &str) -> BomForgeResult<ConversionStatus> {
        validate_handle("conversion_id", conversion_id)?;
        let url = self.url(&format!("/convert/status/{}", conversion_id));
        self.fetch(self.client.get(url), "conversion status").await
    }

    pub async fn get_bom_data(&self, conversion_id: &str) -> BomForgeResult<BomData> {
        validate_handle("conversion_id", conversion_id)?;
        let url = self.url(&format!("/convert/bom/{}", conversion_id));
        self.fetch(self.client.get(url), "BOM data").await
    }

    /// Free-form explanation of the backend's decisions
    pub async fn get_explanation(&self, conversion_id: &str) -> BomForgeResult<serde_json::Value> {
        validate_handle("conversion_id", conversion_id)?;
        let url = self.url(&format!("/convert/explanation/{}", conversion_id));
        self.fetch(self.client.get(url), "explanation").await
    }

    /// Replace the backend's mBOM for a conversion with a locally edited snapshot.
    /// Every item must pass its model validation rules before anything is sent.
    pub async fn save_bom_edits(&self, conversion_id: &str, snapshot: &BomSnapshot) -> BomForgeResult<()> {
        validate_handle("conversion_id", conversion_id)?;
        for item in snapshot.items() {
            validate_model(item).map_err(|e| match e {
                BomForgeError::Validation { message, .. } => BomForgeError::validation(item.part_number(), message),
                other => other,
            })?;
        }
        let url = self.url(&format!("/convert/bom/{}", conversion_id));
        let body = SaveEditsRequest::from(snapshot);
        self.acknowledge(self.client.patch(url).json(&body), "BOM edits")
            .await
    }

    pub async fn submit_feedback(&self, feedback: &FeedbackRequest) -> BomForgeResult<()> {
        validate_handle("conversion_id", &feedback.conversion_id)?;
        self.acknowledge(self.client.post(self.url("/convert/feedback")).json(feedback), "feedback")
            .await
    }

    pub async fn get_conversion_history(
        &self,
        page: u32,
        limit: u32,
        search: Option<&str>,
    ) -> BomForgeResult<HistoryPage> {
        let mut query = vec![("page", page.to_string()), ("limit", limit.to_string())];
        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            query.push(("search", term.to_string()));
        }
        self.fetch(self.client.get(self.url("/history")).query(&query), "history")
            .await
    }

    pub async fn delete_conversion(&self, conversion_id: &str) -> BomForgeResult<()> {
        validate_handle("conversion_id", conversion_id)?;
        let url = self.url(&format!("/history/{}", conversion_id));
        self.acknowledge(self.client.delete(url), "conversion").await
    }

    /// Send and unwrap the envelope's `data`
    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> BomForgeResult<T> {
        self.envelope::<T>(request, what)
            .await?
            .into_result()
            .map_err(|message| BomForgeError::backend_rejected(format!("{} request failed: {}", what, message)))
    }

    /// Send and only check the envelope's `success` flag
    async fn acknowledge(&self, request: RequestBuilder, what: &str) -> BomForgeResult<()> {
        let envelope = self.envelope::<serde_json::Value>(request, what).await?;
        if envelope.success {
            return Ok(());
        }
        let message = envelope
            .error
            .or(envelope.message)
            .unwrap_or_else(|| "Request was not successful".to_string());
        Err(BomForgeError::backend_rejected(format!("{} request failed: {}", what, message)))
    }

    async fn envelope<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> BomForgeResult<ApiResponse<T>> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, what, bytes = body.len(), "Backend responded");

        if status == StatusCode::NOT_FOUND {
            return Err(BomForgeError::not_found(what));
        }
        if !status.is_success() {
            return Err(BomForgeError::backend_status(status.as_u16(), error_text(&body)));
        }

        serde_json::from_str(&body)
            .map_err(|e| BomForgeError::invalid_response(format!("{}: {}", what, e)))
    }
}

/// Prefer the envelope's error text, fall back to the raw body
fn error_text(body: &str) -> String {
    serde_json::from_str::<ApiResponse<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| envelope.error.or(envelope.message))
        .unwrap_or_else(|| body.trim().to_string())
}
