use bytes::Bytes;
use reqwest::{Client, header::CONTENT_TYPE};
use tracing::{info, error};

use crate::{config::ProxyConfig, error::ProxyError, models::GenerationResult};

/// A validated backend success: the typed view for logging and the exact
/// bytes the backend sent, which are what the client receives.
#[derive(Debug, Clone)]
pub struct Generated {
    pub result: GenerationResult,
    pub body: Bytes,
}

/// Point-to-point relay to the generation backend's `/api/generate`.
/// Stateless apart from the connection pool: no retries, no caching.
pub struct BackendClient {
    client: Client,
    endpoint: String,
}

impl BackendClient {
    pub fn new(config: &ProxyConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.backend_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self { client: builder.build()?, endpoint: config.backend_endpoint() })
    }

    pub fn endpoint(&self) -> &str { &self.endpoint }

    /// Send `payload` exactly as received and turn whatever comes back into a
    /// validated result or a `ProxyError`.
    pub async fn forward(&self, payload: Bytes) -> Result<Generated, ProxyError> {
        info!("🔗 Forwarding {} bytes to {}", payload.len(), self.endpoint);

        let response = self.client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        info!("📥 Backend status: {}", status);

        if !status.is_success() {
            let error_body = response.text().await?;
            error!("❌ Backend error response: {}", preview(&error_body, 500));
            return Err(ProxyError::Backend { status, details: error_body });
        }

        let body = response.bytes().await?;
        match GenerationResult::decode(&body) {
            Ok(result) => Ok(Generated { result, body }),
            Err(e) => {
                error!("❌ Unusable backend result: {} (body: {})", e, preview(&String::from_utf8_lossy(&body), 500));
                Err(e)
            }
        }
    }
}

fn preview(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...[{} bytes total]", &s[..idx], s.len()),
        None => s.to_string(),
    }
}
