use std::time::Duration;

use serde::Deserialize;

use super::token::deserialize_secs;

/// Interval RFC 8628 tells clients to use when the provider does not send one.
const DEFAULT_POLLING_INTERVAL_SECS: u64 = 5;

const MIN_POLLING_INTERVAL_SECS: u64 = 1;

fn default_interval() -> u64 {
    DEFAULT_POLLING_INTERVAL_SECS
}

/// Device code response from the identity provider
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceCode {
    pub device_code: String,
    pub user_code: String,
    #[serde(alias = "verification_url")]
    pub verification_uri: String,
    #[serde(deserialize_with = "deserialize_secs")]
    pub expires_in: u64,
    #[serde(default = "default_interval", deserialize_with = "deserialize_secs")]
    pub interval: u64,
    /// Ready-made sign-in instructions, when the provider supplies them.
    #[serde(default)]
    pub message: Option<String>,
}

impl DeviceCode {
    /// Never shorter than one second, whatever the provider sent.
    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.interval.max(MIN_POLLING_INTERVAL_SECS))
    }

    pub fn lifetime(&self) -> Duration {
        Duration::from_secs(self.expires_in)
    }
}

/// Present device code to user
pub fn present_device_code(device_code: &DeviceCode) {
    println!("You need to sign in.");
    if let Some(message) = device_code.message.as_deref() {
        println!("{message}");
        return;
    }

    println!();
    println!("  1. Open your browser and navigate to:");
    println!("     {}", device_code.verification_uri);
    println!();
    println!("  2. Enter the following code:");
    println!();
    println!("     ┌─────────────────────────┐");
    println!("     │  {:^23} │", device_code.user_code);
    println!("     └─────────────────────────┘");
    println!();
    println!(
        "  Waiting for authorization (expires in {} seconds)...",
        device_code.expires_in
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_azure_ad_v1_shape() {
        let body = r#"{
            "user_code": "BQ7HFKTQ9",
            "device_code": "BAQABAAEAAAB",
            "verification_url": "https://microsoft.com/devicelogin",
            "expires_in": "900",
            "interval": "5",
            "message": "To sign in, use a web browser to open the page https://microsoft.com/devicelogin and enter the code BQ7HFKTQ9 to authenticate."
        }"#;
        let code: DeviceCode = serde_json::from_str(body).expect("device code");

        assert_eq!(code.verification_uri, "https://microsoft.com/devicelogin");
        assert_eq!(code.lifetime(), Duration::from_secs(900));
        assert_eq!(code.polling_interval(), Duration::from_secs(5));
        assert!(code.message.unwrap().contains("BQ7HFKTQ9"));
    }

    #[test]
    fn interval_defaults_when_missing() {
        let body = r#"{
            "user_code": "ABCD-EFGH",
            "device_code": "test-device-code",
            "verification_uri": "https://example.com/device",
            "expires_in": 600
        }"#;
        let code: DeviceCode = serde_json::from_str(body).expect("device code");

        assert_eq!(code.interval, 5);
        assert!(code.message.is_none());
    }

    #[test]
    fn zero_interval_is_clamped_to_one_second() {
        let body = r#"{
            "user_code": "ABCD-EFGH",
            "device_code": "test-device-code",
            "verification_uri": "https://example.com/device",
            "expires_in": 600,
            "interval": "0"
        }"#;
        let code: DeviceCode = serde_json::from_str(body).expect("device code");

        assert_eq!(code.interval, 0);
        assert_eq!(code.polling_interval(), Duration::from_secs(1));
    }

    #[test]
    fn rejects_non_numeric_lifetime() {
        let body = r#"{
            "user_code": "ABCD-EFGH",
            "device_code": "test-device-code",
            "verification_uri": "https://example.com/device",
            "expires_in": "soon"
        }"#;
        assert!(serde_json::from_str::<DeviceCode>(body).is_err());
    }
}
