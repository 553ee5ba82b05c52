use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimal client for the third-party image-edit endpoint, built on reqwest.
///
/// One request per generation; provider-side rate-limit and quota failures
/// come back as plain errors and are not retried here.
pub struct ImageEditClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Clone)]
pub struct ImageApiConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Serialize)]
struct EditRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    image: String,
    mime_type: &'a str,
}

#[derive(Deserialize)]
struct EditResponse {
    data: Vec<EditImage>,
}

#[derive(Deserialize)]
struct EditImage {
    b64_json: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetails,
}

#[derive(Debug, Deserialize)]
struct ErrorDetails {
    #[serde(rename = "type")]
    type_: Option<String>,
    code: Option<String>,
    message: Option<String>,
}

impl ImageEditClient {
    pub fn new(config: ImageApiConfig) -> Result<Self> {
        // Edits routinely take tens of seconds; the client timeout is the only
        // bound on the call.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(180))
            .build()
            .context("failed to build image api client")?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            model: config.model,
        })
    }

    pub async fn edit(&self, image: Vec<u8>, mime_type: &str, prompt: &str) -> Result<Vec<u8>> {
        let request = EditRequest {
            model: &self.model,
            prompt,
            image: BASE64.encode(&image),
            mime_type,
        };

        debug!(
            model = %self.model,
            input_bytes = image.len(),
            "image_api: submitting edit request"
        );

        let response = self
            .http
            .post(format!("{}/v1/images/edits", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("image api request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .map(|envelope| {
                    let details = envelope.error;
                    format!(
                        "{} (type={}, code={})",
                        details.message.unwrap_or_else(|| "unknown error".into()),
                        details.type_.unwrap_or_else(|| "unknown".into()),
                        details.code.unwrap_or_else(|| "unknown".into()),
                    )
                })
                .unwrap_or_else(|| body.chars().take(512).collect());

            bail!("image api returned {}: {}", status, message);
        }

        let payload: EditResponse = response
            .json()
            .await
            .context("invalid image api response body")?;

        let first = payload
            .data
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("image api returned no images"))?;

        BASE64
            .decode(first.b64_json)
            .context("image api returned invalid base64 image data")
    }
}
