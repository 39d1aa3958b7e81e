use crate::{
    error::{OptimizeError, classify_status, classify_transport},
    optimizer::Optimizer,
};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response, StatusCode, header::LOCATION};
use std::path::Path;
use tracing::debug;

const DEFAULT_ENDPOINT: &str = "https://api.tinify.com";
const COMPRESSION_COUNT_HEADER: &str = "compression-count";

/// HTTP binding for the shrink API.
///
/// A shrink call is two requests: upload the source bytes, then download
/// the compressed result from the `Location` the service hands back.
pub struct ShrinkClient {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl ShrinkClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    async fn upload(&self, body: Vec<u8>) -> Result<Response, OptimizeError> {
        self.http
            .post(format!("{}/shrink", self.endpoint))
            .basic_auth("api", Some(&self.api_key))
            .body(body)
            .send()
            .await
            .map_err(classify_transport)
    }

    async fn download(&self, url: &str) -> Result<Bytes, OptimizeError> {
        let response = self
            .http
            .get(url)
            .basic_auth("api", Some(&self.api_key))
            .send()
            .await
            .map_err(classify_transport)?;

        if !response.status().is_success() {
            let (status, detail) = error_detail(response).await;
            return Err(classify_status(status, &detail));
        }

        response.bytes().await.map_err(classify_transport)
    }
}

#[async_trait]
impl Optimizer for ShrinkClient {
    async fn optimize(&self, source: &Path, destination: &Path) -> Result<(), OptimizeError> {
        let input = tokio::fs::read(source).await.map_err(|err| {
            OptimizeError::InvalidInputOrRequest(format!(
                "cannot read source {}: {err}",
                source.display()
            ))
        })?;

        let response = self.upload(input).await?;
        if !response.status().is_success() {
            let (status, detail) = error_detail(response).await;
            return Err(classify_status(status, &detail));
        }

        let compressed_url = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| {
                OptimizeError::Unknown("shrink response carried no result location".into())
            })?;

        debug!(source = %source.display(), url = %compressed_url, "downloading compressed output");
        let output = self.download(&compressed_url).await?;

        tokio::fs::write(destination, &output).await.map_err(|err| {
            OptimizeError::Unknown(format!(
                "cannot write optimized output {}: {err}",
                destination.display()
            ))
        })
    }

    async fn compression_count(&self) -> Result<u64, OptimizeError> {
        // An empty upload is rejected as a client error, but a response with
        // valid credentials still carries the month-to-date counter header.
        let response = self.upload(Vec::new()).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let (status, detail) = error_detail(response).await;
            return Err(classify_status(status, &detail));
        }

        response
            .headers()
            .get(COMPRESSION_COUNT_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok())
            .ok_or_else(|| {
                OptimizeError::Unknown("service reported no compression count".into())
            })
    }
}

/// Pulls the human-readable message out of an error response body. The
/// service answers errors with a JSON `{"error": ..., "message": ...}`
/// pair.
async fn error_detail(response: Response) -> (StatusCode, String) {
    let status = response.status();
    let detail = match response.json::<serde_json::Value>().await {
        Ok(body) => body
            .get("message")
            .and_then(|message| message.as_str())
            .map(str::trim)
            .map(str::to_owned)
            .unwrap_or_else(|| body.to_string()),
        Err(_) => "no error detail".to_string(),
    };
    (status, detail)
}
