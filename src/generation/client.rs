//! Image-generation service client.
//!
//! Wire format (JSON over HTTP):
//!
//! ```text
//! POST {base_url}{path}
//! { "model": "...", "prompt": "...",
//!   "image_inputs": [ { "url": "<data: URL or http(s) URL>" } ],
//!   "model_options": { "quality": "high" } }
//!
//! 200 { "url": "https://..." }          url may be absent
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{GenerationConfig, Quality};
use crate::media::MediaError;

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInput {
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOptions {
    pub quality: Quality,
}

/// Built fresh for every submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub image_inputs: Vec<ImageInput>,
    pub model_options: ModelOptions,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, image_url: impl Into<String>, quality: Quality) -> Self {
        Self {
            prompt: prompt.into(),
            image_inputs: vec![ImageInput {
                url: image_url.into(),
            }],
            model_options: ModelOptions { quality },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub url: Option<String>,
}

impl GenerationResponse {
    /// The result URL, if the service returned a usable one.
    pub fn result_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

// ---------------------------------------------------------------------------
// GenerationError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("generation service returned HTTP {0}")]
    Status(u16),

    #[error("generation request timed out")]
    Timeout,

    #[error("failed to parse generation response: {0}")]
    Parse(String),

    /// The input image could not be prepared for upload.
    #[error("input image: {0}")]
    Input(#[from] MediaError),
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenerationError::Timeout
        } else {
            GenerationError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// ImageGenerator trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest)
        -> Result<GenerationResponse, GenerationError>;
}

// ---------------------------------------------------------------------------
// ApiImageGenerator
// ---------------------------------------------------------------------------

pub struct ApiImageGenerator {
    client: reqwest::Client,
    config: GenerationConfig,
}

impl ApiImageGenerator {
    pub fn from_config(config: &GenerationConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    /// Shared HTTP client; also used to inline remote sources.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn endpoint(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = self.config.path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    pub(crate) fn body(&self, request: &GenerationRequest) -> serde_json::Value {
        serde_json::json!({
            "model":         self.config.model,
            "prompt":        request.prompt,
            "image_inputs":  request.image_inputs,
            "model_options": request.model_options,
        })
    }
}

#[async_trait]
impl ImageGenerator for ApiImageGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let mut req = self.client.post(self.endpoint()).json(&self.body(request));

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Status(status.as_u16()));
        }

        response
            .json::<GenerationResponse>()
            .await
            .map_err(|e| GenerationError::Parse(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
