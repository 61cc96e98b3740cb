//! Reqwest-based HTTP client for remote uploads.

use std::sync::Arc;
use std::time::Instant;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use url::Url;
use vitrine_core::{AssetUpload, ServiceHealth, UploadProvider, UploadResponse, UploadService};

use crate::{Error, ReqwestConfig, TRACING_TARGET};

struct ReqwestClientInner {
    http: Client,
    upload_url: Url,
    config: ReqwestConfig,
}

/// Uploads assets to `{api_url}/upload-file` as a multipart form.
///
/// The payload is sent as a single part named `file` carrying the original
/// file name and media type. When a token is configured it is sent as a bearer
/// `Authorization` header. The multipart `Content-Type` (with its boundary) is
/// left to reqwest.
///
/// # Examples
///
/// ```rust,ignore
/// use vitrine_reqwest::{ReqwestClient, ReqwestConfig};
///
/// let config = ReqwestConfig::new("https://api.example.com").with_auth_token(token);
/// let service = ReqwestClient::new(config)?.into_service();
/// ```
#[derive(Clone)]
pub struct ReqwestClient {
    inner: Arc<ReqwestClientInner>,
}

impl std::fmt::Debug for ReqwestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestClient")
            .field("upload_url", &self.inner.upload_url.as_str())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ReqwestClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: ReqwestConfig) -> vitrine_core::Result<Self> {
        let timeout = config.effective_timeout();
        let upload_url = config.upload_url().map_err(Error::from)?;

        tracing::debug!(
            target: TRACING_TARGET,
            upload_url = %upload_url,
            timeout_ms = timeout.as_millis(),
            has_token = config.auth_token.is_some(),
            "Creating reqwest client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(config.effective_user_agent())
            .build()
            .map_err(|e| {
                vitrine_core::Error::configuration()
                    .with_message("Failed to create HTTP client")
                    .with_source(e)
            })?;

        let inner = ReqwestClientInner {
            http,
            upload_url,
            config,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &ReqwestConfig {
        &self.inner.config
    }

    /// Gets the resolved upload endpoint.
    pub fn upload_url(&self) -> &Url {
        &self.inner.upload_url
    }

    /// Converts this client into an [`UploadService`].
    pub fn into_service(self) -> UploadService {
        UploadService::new(self)
    }

    fn form(upload: &AssetUpload) -> Result<Form, Error> {
        let part = Part::bytes(upload.data.to_vec())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.media_type)?;

        Ok(Form::new().part("file", part))
    }

    async fn send(&self, upload: &AssetUpload) -> Result<UploadResponse, Error> {
        let mut request = self
            .inner
            .http
            .post(self.inner.upload_url.clone())
            .multipart(Self::form(upload)?);

        if let Some(token) = &self.inner.config.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait::async_trait]
impl UploadProvider for ReqwestClient {
    async fn upload(&self, upload: &AssetUpload) -> vitrine_core::Result<UploadResponse> {
        tracing::debug!(
            target: TRACING_TARGET,
            url = %self.inner.upload_url,
            file_name = %upload.file_name,
            size = upload.size(),
            "Sending upload request"
        );

        let response = self.send(upload).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            file_url = %response.file_url,
            "Upload accepted"
        );

        Ok(response)
    }

    /// Sends `HEAD` to the upload endpoint.
    ///
    /// Any answer other than `404` or a server error means the endpoint exists;
    /// `405 Method Not Allowed` is the usual reply from a POST-only route.
    async fn health_check(&self) -> vitrine_core::Result<ServiceHealth> {
        let started_at = Instant::now();
        let result = self
            .inner
            .http
            .head(self.inner.upload_url.clone())
            .send()
            .await;
        let elapsed = started_at.elapsed();

        let health = match result {
            Ok(response) => {
                let status = response.status();
                let message = format!("Upload endpoint returned {status}");
                if status == StatusCode::NOT_FOUND || status.is_server_error() {
                    ServiceHealth::unhealthy(message)
                } else {
                    ServiceHealth::healthy().with_message(message)
                }
            }
            Err(error) => ServiceHealth::unhealthy(format!("Upload endpoint unreachable: {error}")),
        };

        Ok(health.with_response_time(elapsed))
    }
}
