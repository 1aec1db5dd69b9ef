use async_trait::async_trait;
use ic_core::config::ApiConfig;
use ic_core::ports::{ScanApiError, ScanApiPort, ScanStatus, SubmitReceipt};
use ic_core::{Barcode, ProductAnalysis, ScanId};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::dto::{InventoryDto, ScanDto, SubmitReceiptDto};

/// Upper bound for error bodies copied into [`ScanApiError::Server`].
const MAX_ERROR_BODY_CHARS: usize = 256;

/// reqwest implementation of [`ScanApiPort`].
///
/// Endpoints (relative to `base_url`):
/// - `POST scan/{scan_id}/image`: raw JPEG body
/// - `GET scan/{scan_id}`
/// - `GET inventory/{barcode}`
///
/// Dropping a returned future aborts the request.
#[derive(Debug, Clone)]
pub struct HttpScanApi {
    client: reqwest::Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl HttpScanApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ScanApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ScanApiError::Transport(format!("failed to build HTTP client: {e}")))?;
        Self::with_client(client, &config.base_url, config.auth_token.clone())
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        auth_token: Option<String>,
    ) -> Result<Self, ScanApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ScanApiError::InvalidRequest(format!("invalid base url {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ScanApiError::InvalidRequest(format!(
                "base url cannot carry a path: {base_url}"
            )));
        }
        Ok(Self {
            client,
            base_url,
            auth_token: auth_token.filter(|token| !token.is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `base_url` with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ScanApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ScanApiError::InvalidRequest(format!("bad base url {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ScanApiError> {
        let request = match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(map_status_code(status, &body))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ScanApiError> {
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&bytes).map_err(|e| ScanApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ScanApiPort for HttpScanApi {
    async fn submit_image(
        &self,
        scan_id: &ScanId,
        image: Vec<u8>,
    ) -> Result<SubmitReceipt, ScanApiError> {
        let url = self.endpoint(&["scan", scan_id.as_str(), "image"])?;
        debug!(%url, bytes = image.len(), "submitting label image");

        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("image/jpeg"))
            .body(image);
        let response = self.send(request).await?;
        let receipt: SubmitReceiptDto = Self::decode(response).await?;
        Ok(receipt.into())
    }

    async fn get_scan(&self, scan_id: &ScanId) -> Result<ScanStatus, ScanApiError> {
        let url = self.endpoint(&["scan", scan_id.as_str()])?;
        debug!(%url, "fetching scan status");

        let response = self.send(self.client.get(url)).await?;
        let dto: ScanDto = Self::decode(response).await?;
        dto.try_into()
    }

    async fn fetch_product(&self, barcode: &Barcode) -> Result<ProductAnalysis, ScanApiError> {
        let url = self.endpoint(&["inventory", barcode.as_str()])?;
        debug!(%url, "fetching product");

        let response = self.send(self.client.get(url)).await?;
        let dto: InventoryDto = Self::decode(response).await?;
        dto.try_into()
    }
}

fn map_reqwest_error(error: reqwest::Error) -> ScanApiError {
    if error.is_timeout() {
        ScanApiError::Transport("request timed out".to_string())
    } else if error.is_decode() {
        ScanApiError::Decode(error.to_string())
    } else if let Some(status) = error.status() {
        map_status_code(status, "")
    } else {
        ScanApiError::Transport(error.to_string())
    }
}

fn map_status_code(code: StatusCode, body: &str) -> ScanApiError {
    let message = error_message(code, body);
    match code {
        StatusCode::NOT_FOUND => ScanApiError::NotFound,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            warn!(status = code.as_u16(), "scan backend rejected credentials");
            ScanApiError::Unauthorized(message)
        }
        _ => ScanApiError::Server {
            status: code.as_u16(),
            message,
        },
    }
}

fn error_message(code: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return code
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string();
    }
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}
