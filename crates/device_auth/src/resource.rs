use std::sync::Arc;

use log::{debug, warn};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;

use crate::error::ResourceError;

/// Calls a bearer-protected endpoint.
#[derive(Debug, Clone)]
pub struct ResourceCaller {
    client: Arc<ClientWithMiddleware>,
}

impl ResourceCaller {
    pub fn new(client: Arc<ClientWithMiddleware>) -> Self {
        Self { client }
    }

    /// GETs `url` and returns the body verbatim on HTTP 200.
    ///
    /// Any other status becomes [`ResourceError::Status`] with the status code,
    /// its reason phrase and whatever body the server sent.
    pub async fn call_resource(&self, url: &str, access_token: &str) -> Result<String, ResourceError> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", access_token))
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(response.text().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
        warn!("Resource call to {url} returned HTTP {} {reason}", status.as_u16());
        Err(ResourceError::Status {
            status: status.as_u16(),
            reason,
            body,
        })
    }
}
