use std::{sync::Arc, time::Duration};

use reqwest::{Client, Proxy};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};

use crate::config::Config;

pub const USER_AGENT: &str = "DeviceProfile/1.0";

/// Proxies come only from `config`, which already folds in `HTTP_PROXY`/`HTTPS_PROXY`.
pub fn build_http_client(config: &Config) -> reqwest::Result<Client> {
    let mut builder = Client::builder()
        .no_proxy()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(config.request_timeout_secs.max(1)));
    if !config.http_proxy.is_empty() {
        builder = builder.proxy(Proxy::http(&config.http_proxy)?);
    }
    if !config.https_proxy.is_empty() {
        builder = builder.proxy(Proxy::https(&config.https_proxy)?);
    }
    builder.build()
}

/// Shared client used by both the identity provider and the resource caller.
///
/// No retry middleware: a refresh-token POST must reach the provider at most once,
/// and the only retried exchange is the device-code polling loop.
pub fn shared_client(config: &Config) -> reqwest::Result<Arc<ClientWithMiddleware>> {
    let client = build_http_client(config)?;
    Ok(Arc::new(ClientBuilder::new(client).build()))
}
