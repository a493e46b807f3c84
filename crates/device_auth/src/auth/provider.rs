use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use reqwest::header::ACCEPT;
use reqwest_middleware::ClientWithMiddleware;

use super::device_code::DeviceCode;
use super::token::{error_from_body, parse_token_response, TokenRecord};
use crate::config::DEFAULT_AUTHORITY;
use crate::error::AuthError;

/// Who is signing in, through which app, for which resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthTarget {
    pub tenant: String,
    pub client_id: String,
    pub resource: String,
}

impl AuthTarget {
    pub fn new(
        tenant: impl Into<String>,
        client_id: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            tenant: tenant.into(),
            client_id: client_id.into(),
            resource: resource.into(),
        }
    }
}

/// The three exchanges the token acquirer needs from an identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn request_device_code(&self, target: &AuthTarget) -> Result<DeviceCode, AuthError>;

    /// One polling attempt. Returns `AuthError::AuthorizationPending` until the user signs in.
    async fn exchange_device_code(
        &self,
        target: &AuthTarget,
        device_code: &DeviceCode,
    ) -> Result<TokenRecord, AuthError>;

    async fn exchange_refresh_token(
        &self,
        target: &AuthTarget,
        refresh_token: &str,
    ) -> Result<TokenRecord, AuthError>;
}

/// Azure AD v1 OAuth2 endpoints (`/{tenant}/oauth2/devicecode` and `/{tenant}/oauth2/token`).
#[derive(Debug, Clone)]
pub struct AzureAdProvider {
    client: Arc<ClientWithMiddleware>,
    authority: String,
}

impl AzureAdProvider {
    pub fn new(client: Arc<ClientWithMiddleware>) -> Self {
        Self {
            client,
            authority: DEFAULT_AUTHORITY.to_string(),
        }
    }

    /// Send requests to another authority host, e.g. a local mock server.
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into();
        self
    }

    fn endpoint(&self, tenant: &str, path: &str) -> String {
        format!(
            "{}/{}/oauth2/{}",
            self.authority.trim_end_matches('/'),
            tenant,
            path
        )
    }

    async fn post_token_form(
        &self,
        tenant: &str,
        params: &[(&str, &str)],
        previous_refresh_token: Option<&str>,
    ) -> Result<TokenRecord, AuthError> {
        let response = self
            .client
            .post(self.endpoint(tenant, "token"))
            .header(ACCEPT, "application/json")
            .form(params)
            .send()
            .await?;

        // Azure AD answers pending and rejected exchanges with HTTP 400 and a JSON error body.
        let status = response.status().as_u16();
        let body = response.text().await?;
        parse_token_response(status, &body, previous_refresh_token)
    }
}

#[async_trait]
impl IdentityProvider for AzureAdProvider {
    async fn request_device_code(&self, target: &AuthTarget) -> Result<DeviceCode, AuthError> {
        let url = self.endpoint(&target.tenant, "devicecode");
        debug!("Requesting device code from {url}");

        let params = [
            ("client_id", target.client_id.as_str()),
            ("resource", target.resource.as_str()),
        ];
        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(error_from_body(status.as_u16(), &body));
        }

        Ok(serde_json::from_str::<DeviceCode>(&body)?)
    }

    async fn exchange_device_code(
        &self,
        target: &AuthTarget,
        device_code: &DeviceCode,
    ) -> Result<TokenRecord, AuthError> {
        let params = [
            ("grant_type", "device_code"),
            ("client_id", target.client_id.as_str()),
            ("resource", target.resource.as_str()),
            ("code", device_code.device_code.as_str()),
        ];
        self.post_token_form(&target.tenant, &params, None).await
    }

    async fn exchange_refresh_token(
        &self,
        target: &AuthTarget,
        refresh_token: &str,
    ) -> Result<TokenRecord, AuthError> {
        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", target.client_id.as_str()),
            ("resource", target.resource.as_str()),
            ("refresh_token", refresh_token),
        ];
        self.post_token_form(&target.tenant, &params, Some(refresh_token))
            .await
    }
}
