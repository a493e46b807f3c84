use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The user has not finished signing in yet.
    #[error("authorization pending")]
    AuthorizationPending,

    #[error("identity provider requested slower polling")]
    SlowDown,

    #[error("device code expired before sign-in completed")]
    DeviceCodeExpired,

    #[error("authentication failed: {code} - {description}")]
    Rejected { code: String, description: String },

    #[error("authentication failed: {0}")]
    Failure(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest_middleware::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected identity provider response: HTTP {status} - {body}")]
    UnexpectedResponse { status: u16, body: String },
}

impl AuthError {
    /// Errors the polling loop answers with another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::AuthorizationPending | AuthError::SlowDown)
    }

    /// Maps an OAuth2 `error` code from the token endpoint onto the taxonomy.
    pub(crate) fn from_oauth_error(code: &str, description: Option<&str>) -> Self {
        match code {
            "authorization_pending" => AuthError::AuthorizationPending,
            "slow_down" => AuthError::SlowDown,
            "expired_token" | "code_expired" => AuthError::DeviceCodeExpired,
            _ => AuthError::Rejected {
                code: code.to_string(),
                description: description.unwrap_or_default().to_string(),
            },
        }
    }
}

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest_middleware::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("resource returned HTTP {status} with message: {reason}")]
    Status {
        status: u16,
        reason: String,
        body: String,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oauth_error_codes_map_onto_taxonomy() {
        assert!(matches!(
            AuthError::from_oauth_error("authorization_pending", None),
            AuthError::AuthorizationPending
        ));
        assert!(matches!(
            AuthError::from_oauth_error("slow_down", Some("later")),
            AuthError::SlowDown
        ));
        assert!(matches!(
            AuthError::from_oauth_error("code_expired", None),
            AuthError::DeviceCodeExpired
        ));
        assert!(matches!(
            AuthError::from_oauth_error("expired_token", None),
            AuthError::DeviceCodeExpired
        ));

        match AuthError::from_oauth_error("access_denied", Some("user declined")) {
            AuthError::Rejected { code, description } => {
                assert_eq!(code, "access_denied");
                assert_eq!(description, "user declined");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn only_pending_and_slow_down_are_transient() {
        assert!(AuthError::AuthorizationPending.is_transient());
        assert!(AuthError::SlowDown.is_transient());
        assert!(!AuthError::DeviceCodeExpired.is_transient());
        assert!(!AuthError::Failure("no result".to_string()).is_transient());
    }

    #[test]
    fn status_error_message_names_code_and_reason() {
        let err = ResourceError::Status {
            status: 401,
            reason: "Unauthorized".to_string(),
            body: String::new(),
        };
        let message = err.to_string();
        assert!(message.contains("401"));
        assert!(message.contains("Unauthorized"));
    }
}
