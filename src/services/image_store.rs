use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use infer::MatcherType;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Invalid image file, unable to upload")]
    BadFormat,

    #[error("Resource not found, unable to upload image")]
    SourceNotFound,

    #[error("Unauthorized action, unable to upload image")]
    Unauthorized,

    #[error("Unknown error while uploading image, please try again.")]
    Unknown(#[source] anyhow::Error),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// External image-hosting collaborator. Entities only ever reference
/// images through the hosted URL returned by `upload`.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Fetches the source image and stores it, returning a stable hosted URL.
    async fn upload(&self, source: &str) -> Result<String, UploadError>;

    /// Removes a previously hosted image. Best-effort: callers treat every
    /// outcome as non-fatal.
    async fn delete(&self, hosted_url: &str) -> Result<DeleteOutcome>;
}

pub struct S3ImageStore {
    client: Client,
    bucket: String,
    public_base_url: String,
    folder: String,
    http: reqwest::Client,
}

impl S3ImageStore {
    pub fn new(client: Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            folder: "student-awards".to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn key_for(&self, hosted_url: &str) -> Option<String> {
        hosted_url
            .strip_prefix(&self.public_base_url)
            .map(|rest| rest.trim_start_matches('/').to_string())
            .filter(|key| !key.is_empty())
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn upload(&self, source: &str) -> Result<String, UploadError> {
        let response = self
            .http
            .get(source)
            .send()
            .await
            .map_err(|e| UploadError::Unknown(e.into()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(UploadError::SourceNotFound);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(UploadError::Unauthorized);
        }
        if !status.is_success() {
            return Err(UploadError::Unknown(anyhow::anyhow!(
                "source fetch failed with status {status}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| UploadError::Unknown(e.into()))?;

        let kind = infer::get(&bytes).ok_or(UploadError::BadFormat)?;
        if kind.matcher_type() != MatcherType::Image {
            return Err(UploadError::BadFormat);
        }

        let key = format!("{}/{}.{}", self.folder, Uuid::new_v4(), kind.extension());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(kind.mime_type())
            .body(ByteStream::from(bytes.to_vec()))
            .send()
            .await
            .map_err(|e| UploadError::Unknown(e.into()))?;

        Ok(format!("{}/{}", self.public_base_url, key))
    }

    async fn delete(&self, hosted_url: &str) -> Result<DeleteOutcome> {
        let Some(key) = self.key_for(hosted_url) else {
            return Ok(DeleteOutcome::NotFound);
        };

        let head = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await;

        if let Err(e) = head {
            let service_error = e.into_service_error();
            if service_error.is_not_found() {
                return Ok(DeleteOutcome::NotFound);
            }
            return Err(anyhow::anyhow!(service_error));
        }

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await?;

        Ok(DeleteOutcome::Deleted)
    }
}
