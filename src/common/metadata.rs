use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::common::types::CreateTokenMetadata;
use crate::constants::happypump::metadata::PLACEHOLDER_METADATA_URI;
use crate::error::{ClientError, ClientResult};

/// Publishes token metadata and returns its URI.
#[async_trait]
pub trait MetadataUploader: Send + Sync {
    async fn upload(&self, metadata: &CreateTokenMetadata) -> ClientResult<String>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    uri: Option<String>,
}

/// Multipart upload to the HappyPump metadata API
#[derive(Clone)]
pub struct HttpMetadataUploader {
    client: reqwest::Client,
    api_url: String,
}

impl HttpMetadataUploader {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), api_url: api_url.into() }
    }

    fn form(metadata: &CreateTokenMetadata) -> ClientResult<Form> {
        let file = Part::bytes(metadata.file.clone())
            .file_name("image.png")
            .mime_str("image/png")?;

        Ok(Form::new()
            .part("file", file)
            .text("name", metadata.name.clone())
            .text("symbol", metadata.symbol.clone())
            .text("description", metadata.description.clone())
            .text("twitter", metadata.twitter.clone().unwrap_or_default())
            .text("telegram", metadata.telegram.clone().unwrap_or_default())
            .text("website", metadata.website.clone().unwrap_or_default())
            .text("showName", "true"))
    }
}

#[async_trait]
impl MetadataUploader for HttpMetadataUploader {
    async fn upload(&self, metadata: &CreateTokenMetadata) -> ClientResult<String> {
        let response = self
            .client
            .post(&self.api_url)
            .multipart(Self::form(metadata)?)
            .send()
            .await?
            .error_for_status()?;

        let body: UploadResponse = response.json().await?;
        body.uri.ok_or_else(|| ClientError::Metadata("response has no `uri`".to_string()))
    }
}

/// Uploads metadata, falling back to a placeholder URI when the upload fails.
pub async fn upload_or_placeholder(
    uploader: &dyn MetadataUploader,
    metadata: &CreateTokenMetadata,
) -> String {
    match uploader.upload(metadata).await {
        Ok(uri) => uri,
        Err(e) => {
            log::error!(
                "metadata upload for {} failed, using placeholder uri: {}",
                metadata.symbol,
                e
            );
            PLACEHOLDER_METADATA_URI.to_string()
        }
    }
}
