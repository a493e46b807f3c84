use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::time::{sleep, Instant};

use super::cache::TokenCache;
use super::device_code::{present_device_code, DeviceCode};
use super::provider::{AuthTarget, IdentityProvider};
use super::token::TokenRecord;
use crate::error::AuthError;

/// Extra wait added each time the provider answers `slow_down` (RFC 8628 §3.5).
const SLOW_DOWN_INCREMENT: Duration = Duration::from_secs(5);

/// Obtains access tokens through the device-code flow and renews them with refresh tokens.
///
/// The acquirer owns its [`TokenCache`]. The first request for a (tenant, resource)
/// pair signs the user in with a device code; every later request exchanges the
/// cached refresh token instead.
pub struct TokenAcquirer<P> {
    provider: P,
    cache: TokenCache,
    fallback_to_device_code: bool,
}

impl<P: IdentityProvider> TokenAcquirer<P> {
    pub fn new(provider: P, cache: TokenCache) -> Self {
        Self {
            provider,
            cache,
            fallback_to_device_code: false,
        }
    }

    /// When enabled, a failed refresh evicts the cached record and signs in again.
    pub fn with_refresh_fallback(mut self, enabled: bool) -> Self {
        self.fallback_to_device_code = enabled;
        self
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn acquire_token(
        &mut self,
        tenant: &str,
        resource: &str,
        client_id: &str,
    ) -> Result<TokenRecord, AuthError> {
        let target = AuthTarget::new(tenant, client_id, resource);

        if let Some(cached) = self.cache.get(tenant, resource) {
            let refresh_token = cached.refresh_token.clone();
            match self.refresh(&target, &refresh_token).await {
                Ok(record) => return Ok(record),
                Err(err) if self.fallback_to_device_code => {
                    warn!("Refresh token exchange failed ({err}), signing in again");
                    self.cache.remove(tenant, resource);
                }
                Err(err) => return Err(err),
            }
        }

        self.sign_in_with_device_code(&target).await
    }

    async fn refresh(
        &mut self,
        target: &AuthTarget,
        refresh_token: &str,
    ) -> Result<TokenRecord, AuthError> {
        if refresh_token.is_empty() {
            return Err(AuthError::Failure(
                "cached token has no refresh token".to_string(),
            ));
        }

        info!("Refreshing token for {}", target.resource);
        let record = self
            .provider
            .exchange_refresh_token(target, refresh_token)
            .await?;
        self.cache
            .insert(&target.tenant, &target.resource, record.clone());
        Ok(record)
    }

    async fn sign_in_with_device_code(
        &mut self,
        target: &AuthTarget,
    ) -> Result<TokenRecord, AuthError> {
        info!("No cached token for {}, starting device code sign-in", target.resource);
        let device_code = self.provider.request_device_code(target).await?;
        present_device_code(&device_code);

        let record = self.poll_for_token(target, &device_code).await?;
        self.cache
            .insert(&target.tenant, &target.resource, record.clone());
        Ok(record)
    }

    /// Polls until the user signs in, a non-transient error arrives, or the code expires.
    async fn poll_for_token(
        &self,
        target: &AuthTarget,
        device_code: &DeviceCode,
    ) -> Result<TokenRecord, AuthError> {
        let start = Instant::now();
        let max_duration = device_code.lifetime();
        let mut interval = device_code.polling_interval();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            match self.provider.exchange_device_code(target, device_code).await {
                Ok(record) => {
                    info!("Device code sign-in completed after {attempts} attempt(s)");
                    return Ok(record);
                }
                Err(AuthError::AuthorizationPending) => {
                    debug!("Authorization pending, sleeping {}s", interval.as_secs());
                }
                Err(AuthError::SlowDown) => {
                    interval = interval.saturating_add(SLOW_DOWN_INCREMENT);
                    warn!(
                        "Identity provider requested slower polling, interval now {}s",
                        interval.as_secs()
                    );
                }
                Err(err) => {
                    error!("Device code exchange failed: {err}");
                    return Err(err);
                }
            }

            if start.elapsed().saturating_add(interval) > max_duration {
                warn!("Device code expired after {attempts} attempt(s)");
                return Err(AuthError::DeviceCodeExpired);
            }
            sleep(interval).await;
        }
    }
}
