// SPDX-License-Identifier: GPL-3.0-only

//! HTTP client for the orthomosaic service
//!
//! Every call either returns a successful response ready to be streamed or a
//! [`RemoteError`]. No call is retried.

pub mod ndjson;
pub mod requests;
pub mod responses;

pub use ndjson::{LineBuffer, ndjson_lines, parse_line};
pub use requests::{BackdownImageRequest, DownloadQuery, FolderUpdateRequest, TargetField};
pub use responses::{StatusLine, TileLine};

use crate::config::Config;
use crate::constants::{UPDATE_FOLDER_PATH, UPDATE_IMAGE_PATH};
use crate::errors::{AppError, AppResult, RemoteError};
use tracing::{debug, info};

/// Client identification sent with every request
const USER_AGENT: &str = concat!("orthomosaic-client/", env!("GIT_VERSION"));

#[derive(Debug, Clone)]
pub struct OrthomosaicClient {
    http: reqwest::Client,
    endpoint: String,
    orthorectify_endpoint: String,
}

impl OrthomosaicClient {
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: with_trailing_slash(&config.endpoint),
            orthorectify_endpoint: config.orthorectify_endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Add one image to an orthomosaic; the response is an NDJSON status stream
    pub async fn update_image(
        &self,
        request: &BackdownImageRequest,
    ) -> Result<reqwest::Response, RemoteError> {
        let url = format!("{}{}", self.endpoint, UPDATE_IMAGE_PATH);
        debug!(url = %url, "POST update image");
        let response = self.http.post(&url).json(request).send().await?;
        ensure_success(response).await
    }

    /// Build an orthomosaic from a storage folder; NDJSON status stream
    pub async fn update_folder(
        &self,
        request: &FolderUpdateRequest,
    ) -> Result<reqwest::Response, RemoteError> {
        let url = format!("{}{}", self.endpoint, UPDATE_FOLDER_PATH);
        info!(url = %url, location = %request.location, "POST update folder");
        let response = self.http.post(&url).json(request).send().await?;
        ensure_success(response).await
    }

    /// Fetch an orthomosaic; NDJSON stream of base64 image chunks
    pub async fn download(&self, query: &DownloadQuery) -> Result<reqwest::Response, RemoteError> {
        info!(orthomosaic_id = %query.orthomosaic_id, "GET orthomosaic");
        let response = self.http.get(&self.endpoint).query(query).send().await?;
        ensure_success(response).await
    }

    /// Orthorectify a single image; the response body is the image itself
    pub async fn orthorectify(&self, request: &BackdownImageRequest) -> Result<Vec<u8>, RemoteError> {
        debug!(url = %self.orthorectify_endpoint, "POST orthorectify");
        let response = self
            .http
            .post(&self.orthorectify_endpoint)
            .json(request)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Turn a non-success status into an error carrying the reason and body text
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut reason = status
        .canonical_reason()
        .unwrap_or("Unknown status")
        .to_string();
    if let Ok(body) = response.text().await {
        let body = body.trim();
        if !body.is_empty() {
            reason = format!("{}: {}", reason, body);
        }
    }
    Err(RemoteError::Http {
        status: status.as_u16(),
        reason,
    })
}

fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}
