//! REST client for the media service endpoints.
//!
//! Wraps start, cancel, metadata lookup, artifact retrieval and cleanup
//! behind [`ServiceApi`] so the engine can be driven against a fake.

use std::time::Duration;

use bytes::Bytes;
use clipfetch_logging::clip_debug;
use serde::Serialize;
use thiserror::Error;

use crate::{JobRequest, MediaInfo, SessionId, SESSION_HEADER};

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused, reset, timeout).
    #[error("{0}")]
    Transport(String),
    /// The service answered with a non-2xx status.
    #[error("http status {status}")]
    Status { status: u16 },
    /// The response body could not be read or decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

#[async_trait::async_trait]
pub trait ServiceApi: Send + Sync {
    /// `POST /api/videos/download`, session-correlated.
    async fn start_job(&self, session: &SessionId, request: &JobRequest) -> Result<(), ApiError>;

    /// `POST /api/videos/cancel`, session-correlated, no body.
    async fn cancel_job(&self, session: &SessionId) -> Result<(), ApiError>;

    /// `POST /api/videos/info`.
    async fn media_info(&self, request: &JobRequest) -> Result<MediaInfo, ApiError>;

    /// `GET /api/videos/download/{file_name}`.
    async fn fetch_artifact(&self, file_name: &str) -> Result<Bytes, ApiError>;

    /// `DELETE /api/videos/cleanup/{file_name}`.
    async fn cleanup(&self, file_name: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Serialize)]
struct InfoRequest<'a> {
    url: &'a str,
    platform: &'a str,
    cookies: &'a str,
}

#[derive(Debug, Clone)]
pub struct ReqwestServiceApi {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestServiceApi {
    pub fn new(
        base_url: impl Into<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Reuse an existing client (shared connection pool).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/videos{}", self.base_url, path)
    }

    fn file_endpoint(&self, prefix: &str, file_name: &str) -> String {
        self.endpoint(&format!("{prefix}/{}", urlencoding::encode(file_name)))
    }
}

#[async_trait::async_trait]
impl ServiceApi for ReqwestServiceApi {
    async fn start_job(&self, session: &SessionId, request: &JobRequest) -> Result<(), ApiError> {
        clip_debug!("POST start url={} platform={}", request.url, request.platform);
        let response = self
            .client
            .post(self.endpoint("/download"))
            .header(SESSION_HEADER, session.as_str())
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(response).map(drop)
    }

    async fn cancel_job(&self, session: &SessionId) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint("/cancel"))
            .header(SESSION_HEADER, session.as_str())
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(response).map(drop)
    }

    async fn media_info(&self, request: &JobRequest) -> Result<MediaInfo, ApiError> {
        let body = InfoRequest {
            url: &request.url,
            platform: &request.platform,
            cookies: &request.cookies,
        };
        let response = self
            .client
            .post(self.endpoint("/info"))
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(response)?
            .json::<MediaInfo>()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn fetch_artifact(&self, file_name: &str) -> Result<Bytes, ApiError> {
        let response = self
            .client
            .get(self.file_endpoint("/download", file_name))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(response)?
            .bytes()
            .await
            .map_err(map_reqwest_error)
    }

    async fn cleanup(&self, file_name: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.file_endpoint("/cleanup", file_name))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(response).map(drop)
    }
}

fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status {
            status: status.as_u16(),
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Transport(format!("timeout: {err}"));
    }
    if err.is_decode() || err.is_body() {
        return ApiError::Decode(err.to_string());
    }
    ApiError::Transport(err.to_string())
}
