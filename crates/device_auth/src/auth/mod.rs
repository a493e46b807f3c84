//! Device Code Authentication
//!
//! Device Code Flow:
//! 1. Request a device code from `{authority}{tenant}/oauth2/devicecode`
//! 2. User signs in at the verification URL with the user code
//! 3. Poll `{authority}{tenant}/oauth2/token` until sign-in completes
//! 4. Cache the token record; later requests renew it with the refresh token

pub mod acquirer;
pub mod cache;
pub mod device_code;
pub mod provider;
pub mod token;

pub use acquirer::TokenAcquirer;
pub use cache::{CacheKey, TokenCache};
pub use device_code::{present_device_code, DeviceCode};
pub use provider::{AuthTarget, AzureAdProvider, IdentityProvider};
pub use token::TokenRecord;
