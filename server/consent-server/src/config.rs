use dotenvy::dotenv;
use url::Url;

use consent_types::ConsentError;

pub const DEFAULT_BIND_ADDR: &str = "localhost:8080";
pub const DEFAULT_COOKIE_NAME: &str = "oauth2ConsentApp";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// Process configuration for the consent application, loaded once at
/// startup and handed to request handlers through the service context.
#[derive(Debug, Clone)]
pub struct ConsentConfig {
    pub bind_addr: String,
    /// Client id shown in the demo consent URI on the home page.
    pub demo_client_id: String,
    /// Base URL of the provider's admin interface (credential lookups).
    pub admin_endpoint: String,
    /// Base URL of the provider's proxy interface (authorize calls).
    pub proxy_endpoint: String,
    /// Path prefix under the proxy where the protected API lives.
    pub api_path: String,
    /// Pre-shared secret authorizing this application to request codes.
    pub provision_key: String,
    pub cookie_name: String,
    pub session_ttl_secs: u64,
    /// Disable TLS certificate verification on outbound provider calls.
    /// For testing against providers with self-signed certificates only.
    pub insecure_tls: bool,
}

impl ConsentConfig {
    pub fn from_env() -> Result<Self, ConsentError> {
        let _ = dotenv();

        let admin_endpoint = require_env("PROVIDER_ADMIN_ENDPOINT")?;
        let proxy_endpoint = require_env("PROVIDER_PROXY_ENDPOINT")?;
        for (key, value) in [
            ("PROVIDER_ADMIN_ENDPOINT", &admin_endpoint),
            ("PROVIDER_PROXY_ENDPOINT", &proxy_endpoint),
        ] {
            Url::parse(value).map_err(|err| {
                ConsentError::InvalidConfig(format!("invalid url provided via {}: {}", key, err))
            })?;
        }

        let session_ttl_secs = match optional_env("CONSENT_SESSION_TTL_SECS")? {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                ConsentError::InvalidConfig(format!(
                    "CONSENT_SESSION_TTL_SECS must be a number of seconds, got '{}'",
                    raw
                ))
            })?,
            None => DEFAULT_SESSION_TTL_SECS,
        };

        let insecure_tls = match optional_env("CONSENT_INSECURE_TLS")? {
            Some(raw) => raw.parse::<bool>().map_err(|_| {
                ConsentError::InvalidConfig(format!(
                    "CONSENT_INSECURE_TLS must be 'true' or 'false', got '{}'",
                    raw
                ))
            })?,
            None => false,
        };

        Ok(Self {
            bind_addr: optional_env("CONSENT_BIND_ADDR")?
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            demo_client_id: require_env("DEMO_CLIENT_ID")?,
            admin_endpoint: admin_endpoint.trim_end_matches('/').to_string(),
            proxy_endpoint: proxy_endpoint.trim_end_matches('/').to_string(),
            api_path: optional_env("API_PATH")?.unwrap_or_default(),
            provision_key: require_env("PROVISION_KEY")?,
            cookie_name: optional_env("CONSENT_COOKIE_NAME")?
                .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string()),
            session_ttl_secs,
            insecure_tls,
        })
    }
}

fn require_env(key: &str) -> Result<String, ConsentError> {
    optional_env(key)?.ok_or_else(|| {
        ConsentError::InvalidConfig(format!("missing required environment variable {}", key))
    })
}

fn optional_env(key: &str) -> Result<Option<String>, ConsentError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(Some(value)),
        Ok(_) => Ok(None),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConsentError::InvalidConfig(format!(
            "environment variable {} contains invalid unicode",
            key
        ))),
    }
}
