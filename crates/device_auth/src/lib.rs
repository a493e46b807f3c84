pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod resource;

pub use auth::{
    AuthTarget, AzureAdProvider, DeviceCode, IdentityProvider, TokenAcquirer, TokenCache,
    TokenRecord,
};
pub use config::Config;
pub use error::{AuthError, ConfigError, ResourceError};
pub use resource::ResourceCaller;
