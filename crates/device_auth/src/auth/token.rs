use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::AuthError;

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

/// An access token together with the refresh token that renews it.
#[derive(Clone, PartialEq)]
pub struct TokenRecord {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl TokenRecord {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_in_secs: u64,
    ) -> Self {
        let lifetime = chrono::Duration::seconds(expires_in_secs.min(i32::MAX as u64) as i64);
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            token_type: default_token_type(),
            expires_at: Utc::now() + lifetime,
        }
    }
}

fn mask(secret: &str) -> String {
    let len = secret.chars().count();
    if len <= 8 {
        return "*".repeat(len);
    }
    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}…({len} chars)")
}

impl fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRecord")
            .field("access_token", &mask(&self.access_token))
            .field("refresh_token", &mask(&self.refresh_token))
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Seconds {
    Number(u64),
    Text(String),
}

impl Seconds {
    fn into_u64<E: serde::de::Error>(self) -> Result<u64, E> {
        match self {
            Seconds::Number(n) => Ok(n),
            Seconds::Text(s) => s.trim().parse().map_err(E::custom),
        }
    }
}

/// Azure AD v1 sends durations as numeric strings; RFC 8628 providers send numbers.
pub(crate) fn deserialize_secs<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Seconds::deserialize(deserializer)?.into_u64()
}

pub(crate) fn deserialize_opt_secs<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Seconds>::deserialize(deserializer)?
        .map(Seconds::into_u64)
        .transpose()
}

/// Body of the token endpoint, covering both success and OAuth2 error shapes.
#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    token_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_secs")]
    expires_in: Option<u64>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,
    error_description: Option<String>,
}

/// Turns a non-success identity provider reply into an error, keeping the OAuth2 code if present.
pub(crate) fn error_from_body(status: u16, body: &str) -> AuthError {
    match serde_json::from_str::<OAuthErrorBody>(body) {
        Ok(parsed) => AuthError::from_oauth_error(&parsed.error, parsed.error_description.as_deref()),
        Err(_) => AuthError::UnexpectedResponse {
            status,
            body: body.to_string(),
        },
    }
}

pub(crate) fn parse_token_response(
    status: u16,
    body: &str,
    previous_refresh_token: Option<&str>,
) -> Result<TokenRecord, AuthError> {
    let response = match serde_json::from_str::<TokenEndpointResponse>(body) {
        Ok(response) => response,
        Err(_) => {
            return Err(AuthError::UnexpectedResponse {
                status,
                body: body.to_string(),
            })
        }
    };

    if let Some(code) = response.error.as_deref() {
        return Err(AuthError::from_oauth_error(
            code,
            response.error_description.as_deref(),
        ));
    }

    let access_token = match response.access_token {
        Some(token) if (200..300).contains(&status) && !token.is_empty() => token,
        _ => {
            return Err(AuthError::UnexpectedResponse {
                status,
                body: body.to_string(),
            })
        }
    };

    // A refresh reply may omit the refresh token; the old one stays valid then.
    let refresh_token = response
        .refresh_token
        .or_else(|| previous_refresh_token.map(str::to_string))
        .unwrap_or_default();

    let mut record = TokenRecord::new(
        access_token,
        refresh_token,
        response.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS),
    );
    if let Some(token_type) = response.token_type {
        record.token_type = token_type;
    }
    Ok(record)
}
