use crate::keys::scoped_public_id;
use crate::traits::{DeleteResponse, ImageStore, StorageError, StorageResult, UploadResponse};
use crate::ImageStoreBackend;
use async_trait::async_trait;
use bytes::Bytes;
use quill_core::CloudinaryConfig;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct UploadBody {
    public_id: String,
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyBody {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Cloudinary image store
///
/// Talks to the Cloudinary upload API with signed requests. Rejections (4xx/5xx)
/// are returned as responses carrying the status; only transport failures and
/// unreadable bodies become errors.
#[derive(Clone)]
pub struct CloudinaryStore {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    api_base: String,
    folder: Option<String>,
}

impl CloudinaryStore {
    pub fn new(config: &CloudinaryConfig) -> StorageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(CloudinaryStore {
            client,
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            api_base: config.api_base.clone(),
            folder: config.folder.clone(),
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/image/{}",
            self.api_base.trim_end_matches('/'),
            self.cloud_name,
            action
        )
    }

    /// Request signature: parameters sorted by name, joined as `k=v` with `&`,
    /// followed by the API secret, hashed with SHA-256.
    pub(crate) fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted: Vec<_> = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.text().await {
            Ok(text) => serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or_else(|_| {
                    if text.is_empty() {
                        status.to_string()
                    } else {
                        text
                    }
                }),
            Err(_) => status.to_string(),
        }
    }
}

#[async_trait]
impl ImageStore for CloudinaryStore {
    async fn upload(
        &self,
        upload_key: &str,
        file_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<UploadResponse> {
        let public_id = scoped_public_id(self.folder.as_deref(), upload_key);
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("overwrite", "true"),
            ("public_id", public_id.as_str()),
            ("timestamp", timestamp.as_str()),
        ]);
        let size = data.len();
        let start = std::time::Instant::now();

        let part = Part::stream_with_length(data, size as u64)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| StorageError::UploadFailed(format!("Invalid content type: {}", e)))?;

        let form = Form::new()
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("public_id", public_id)
            .text("overwrite", "true")
            .text("signature_algorithm", "sha256")
            .text("signature", signature)
            .part("file", part);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Cloudinary request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response).await;
            tracing::warn!(
                file_name = %file_name,
                status = %status,
                error = %message,
                "Cloudinary rejected upload"
            );
            return Ok(UploadResponse::rejected(status, message));
        }

        let body: UploadBody = response.json().await.map_err(|e| {
            StorageError::InvalidResponse(format!("Failed to parse upload response: {}", e))
        })?;

        tracing::info!(
            file_name = %file_name,
            public_id = %body.public_id,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Cloudinary upload successful"
        );

        Ok(UploadResponse {
            status,
            public_id: body.public_id,
            url: body.secure_url,
            error: None,
        })
    }

    async fn delete(&self, public_id: &str) -> StorageResult<DeleteResponse> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&[("public_id", public_id), ("timestamp", timestamp.as_str())]);
        let start = std::time::Instant::now();

        let params = [
            ("api_key", self.api_key.as_str()),
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
            ("signature_algorithm", "sha256"),
            ("signature", signature.as_str()),
        ];

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&params)
            .send()
            .await
            .map_err(|e| StorageError::DeleteFailed(format!("Cloudinary request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response).await;
            tracing::warn!(
                public_id = %public_id,
                status = %status,
                error = %message,
                "Cloudinary rejected delete"
            );
            return Ok(DeleteResponse {
                status,
                result: message,
            });
        }

        let body: DestroyBody = response.json().await.map_err(|e| {
            StorageError::InvalidResponse(format!("Failed to parse destroy response: {}", e))
        })?;

        tracing::info!(
            public_id = %public_id,
            result = %body.result,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Cloudinary delete finished"
        );

        Ok(DeleteResponse {
            status,
            result: body.result,
        })
    }

    fn backend_type(&self) -> ImageStoreBackend {
        ImageStoreBackend::Cloudinary
    }
}
