use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com/";
pub const DEFAULT_TENANT: &str = "blueskyabove.onmicrosoft.com";
pub const DEFAULT_CLIENT_ID: &str = "b5efa781-c995-4398-802c-3eedc91d2a39";
pub const DEFAULT_RESOURCE: &str = "https://graph.microsoft.com";
pub const DEFAULT_RESOURCE_URL: &str = "https://graph.microsoft.com/v1.0/me";

pub const CONFIG_FILE_PATH: &str = "device_profile.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub tenant: String,
    pub client_id: String,
    pub resource: String,
    pub resource_url: String,
    /// Run a fresh device-code flow when a refresh-token exchange fails.
    pub fallback_to_device_code: bool,
    pub http_proxy: String,
    pub https_proxy: String,
    pub request_timeout_secs: u64,
}

fn parse_bool_env(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tenant: DEFAULT_TENANT.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            resource: DEFAULT_RESOURCE.to_string(),
            resource_url: DEFAULT_RESOURCE_URL.to_string(),
            fallback_to_device_code: false,
            http_proxy: String::new(),
            https_proxy: String::new(),
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Loads defaults, then the config file, then environment overrides.
    ///
    /// An explicit `path` must exist. Without one, `device_profile.toml` is read
    /// only if it is present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Path::new(CONFIG_FILE_PATH);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    log::debug!("No config file at {}, using defaults", path.display());
                    Config::default()
                }
            }
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str::<Config>(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub(crate) fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(tenant) = lookup("DEVICE_PROFILE_TENANT") {
            self.tenant = tenant;
        }
        if let Some(client_id) = lookup("DEVICE_PROFILE_CLIENT_ID") {
            self.client_id = client_id;
        }
        if let Some(resource) = lookup("DEVICE_PROFILE_RESOURCE") {
            self.resource = resource;
        }
        if let Some(resource_url) = lookup("DEVICE_PROFILE_RESOURCE_URL") {
            self.resource_url = resource_url;
        }
        if let Some(fallback) = lookup("DEVICE_PROFILE_REFRESH_FALLBACK") {
            self.fallback_to_device_code = parse_bool_env(&fallback);
        }
        if let Some(http_proxy) = lookup("HTTP_PROXY") {
            self.http_proxy = http_proxy;
        }
        if let Some(https_proxy) = lookup("HTTPS_PROXY") {
            self.https_proxy = https_proxy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn parse_bool_env_true_values() {
        for value in ["1", "true", "TRUE", " yes ", "Y", "on"] {
            assert!(parse_bool_env(value), "value {value:?} should be true");
        }
    }

    #[test]
    fn parse_bool_env_false_values() {
        for value in ["0", "false", "no", "off", "", "  "] {
            assert!(!parse_bool_env(value), "value {value:?} should be false");
        }
    }

    #[test]
    fn defaults_target_graph_me() {
        let config = Config::default();
        assert_eq!(config.resource, DEFAULT_RESOURCE);
        assert_eq!(config.resource_url, DEFAULT_RESOURCE_URL);
        assert!(!config.fallback_to_device_code);
    }

    #[test]
    fn file_values_fill_in_over_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("device_profile.toml");
        std::fs::write(
            &path,
            "tenant = \"contoso.onmicrosoft.com\"\nfallback_to_device_code = true\n",
        )
        .expect("write config");

        let config = Config::from_file(&path).expect("load config");
        assert_eq!(config.tenant, "contoso.onmicrosoft.com");
        assert!(config.fallback_to_device_code);
        assert_eq!(config.client_id, DEFAULT_CLIENT_ID);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("device_profile.toml");
        std::fs::write(&path, "tenant = [").expect("write config");

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn explicit_missing_path_is_a_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing.toml");

        let err = Config::load(Some(&path)).unwrap_err();
        match err {
            ConfigError::Read { path: reported, .. } => assert!(reported.ends_with("missing.toml")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn env_overrides_win_over_file() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DEVICE_PROFILE_TENANT", "fabrikam.onmicrosoft.com"),
            ("DEVICE_PROFILE_REFRESH_FALLBACK", "yes"),
            ("HTTPS_PROXY", "http://proxy.local:3128"),
        ]);

        let mut config = Config {
            tenant: "contoso.onmicrosoft.com".to_string(),
            ..Config::default()
        };
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.tenant, "fabrikam.onmicrosoft.com");
        assert!(config.fallback_to_device_code);
        assert_eq!(config.https_proxy, "http://proxy.local:3128");
        assert_eq!(config.resource, DEFAULT_RESOURCE);
    }
}
