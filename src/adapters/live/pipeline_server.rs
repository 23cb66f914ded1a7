//! Live adapter for a pipeline server hosting SDXL + IP-Adapter.
//!
//! The server owns the weights and the GPU; this client only forwards
//! lifecycle calls as JSON over HTTP.

use std::time::Duration;

use base64::Engine;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PipelineError;
use crate::ports::{
    AdapterRequest, Device, DeviceReport, DiffusionPipeline, GenerateRequest, GeneratedImage,
    LoadRequest, PipelineFuture, PipelineHandle,
};

/// Longest error body echoed back to the user.
const MAX_ERROR_BODY: usize = 500;

/// HTTP client for a hosted diffusion pipeline.
pub struct PipelineServerClient {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl PipelineServerClient {
    /// Create a client for the server at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        endpoint: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, PipelineError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint: endpoint.trim_end_matches('/').to_string(), token })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.token {
            Some(ref token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, PipelineError> {
        debug!(path, "GET");
        let response = self.authorize(self.client.get(self.url(path))).send().await?;
        parse_response(response).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, PipelineError> {
        debug!(path, "POST");
        let response = self.authorize(self.client.post(self.url(path))).json(body).send().await?;
        parse_response(response).await
    }

    /// POST where only the status matters.
    async fn call<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), PipelineError> {
        self.post::<_, serde::de::IgnoredAny>(path, body).await.map(|_| ())
    }
}

async fn parse_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, PipelineError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(PipelineError::Api { status: status.as_u16(), message: truncate(&text) });
    }

    // Calls that return nothing may send an empty body.
    let text = if text.trim().is_empty() { "null" } else { text.as_str() };
    serde_json::from_str(text)
        .map_err(|e| PipelineError::Protocol(format!("{e}. Body: {}", truncate(text))))
}

fn truncate(text: &str) -> String {
    if text.len() <= MAX_ERROR_BODY {
        return text.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

impl DiffusionPipeline for PipelineServerClient {
    fn probe(&self) -> PipelineFuture<'_, DeviceReport> {
        Box::pin(async move { self.get::<DeviceReport>("/v1/health").await })
    }

    fn load(&self, request: &LoadRequest) -> PipelineFuture<'_, PipelineHandle> {
        let request = request.clone();
        Box::pin(async move { self.post::<_, PipelineHandle>("/v1/pipelines", &request).await })
    }

    fn load_ip_adapter(
        &self,
        handle: &PipelineHandle,
        request: &AdapterRequest,
    ) -> PipelineFuture<'_, ()> {
        let path = format!("/v1/pipelines/{}/ip-adapter", handle.id);
        let request = request.clone();
        Box::pin(async move { self.call(&path, &request).await })
    }

    fn set_ip_adapter_scale(&self, handle: &PipelineHandle, scale: f32) -> PipelineFuture<'_, ()> {
        let path = format!("/v1/pipelines/{}/ip-adapter/scale", handle.id);
        Box::pin(async move { self.call(&path, &serde_json::json!({ "scale": scale })).await })
    }

    fn to_device(&self, handle: &PipelineHandle, device: Device) -> PipelineFuture<'_, ()> {
        let path = format!("/v1/pipelines/{}/device", handle.id);
        Box::pin(async move { self.call(&path, &serde_json::json!({ "device": device })).await })
    }

    fn generate(
        &self,
        handle: &PipelineHandle,
        request: &GenerateRequest,
    ) -> PipelineFuture<'_, GeneratedImage> {
        let path = format!("/v1/pipelines/{}/generate", handle.id);
        let request = request.clone();
        Box::pin(async move {
            let parsed: GenerateResponse = self.post(&path, &request).await?;
            let first = parsed
                .images
                .into_iter()
                .next()
                .ok_or_else(|| PipelineError::Protocol("No images in response".into()))?;
            let data = base64::engine::general_purpose::STANDARD
                .decode(&first.data)
                .map_err(|e| PipelineError::Protocol(format!("Failed to decode base64: {e}")))?;
            Ok::<_, PipelineError>(GeneratedImage {
                data,
                mime_type: first.mime_type.unwrap_or_else(|| "image/png".into()),
            })
        })
    }
}

// --- Pipeline server response types ---

#[derive(Deserialize)]
struct GenerateResponse {
    images: Vec<EncodedImage>,
}

#[derive(Deserialize)]
struct EncodedImage {
    data: String,
    mime_type: Option<String>,
}
