//! Guard configuration. Every value here is public and ends up in the page;
//! do not store secrets here.

/// Page visitors are sent to when they must sign in.
pub const LOGIN_PAGE: &str = "login.html";

/// Where `redirect_after_auth` goes when no intent was remembered.
pub const DEFAULT_DESTINATION: &str = "/report.html";

/// Storage key holding the remembered `next` path.
pub const NEXT_STORAGE_KEY: &str = "auth_next";

/// Public identifiers of the identity provider project.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderConfig {
    pub url: String,
    pub anon_key: String,
}

impl ProviderConfig {
    /// Loads the identifiers baked in at build time.
    #[must_use]
    pub fn load() -> Self {
        Self {
            url: option_env!("GATEKEEPER_IDENTITY_URL")
                .unwrap_or_default()
                .to_string(),
            anon_key: option_env!("GATEKEEPER_IDENTITY_ANON_KEY")
                .unwrap_or_default()
                .to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardConfig {
    pub provider: ProviderConfig,
    pub login_page: String,
    pub default_destination: String,
    pub storage_key: String,
}

impl GuardConfig {
    #[must_use]
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            login_page: LOGIN_PAGE.to_string(),
            default_destination: DEFAULT_DESTINATION.to_string(),
            storage_key: NEXT_STORAGE_KEY.to_string(),
        }
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self::new(ProviderConfig::load())
    }
}

#[cfg(test)]
mod tests {
    use super::{GuardConfig, ProviderConfig};

    #[test]
    fn guard_config_defaults() {
        let config = GuardConfig::new(ProviderConfig {
            url: "https://project.example.co".to_string(),
            anon_key: "anon".to_string(),
        });
        assert_eq!(config.login_page, "login.html");
        assert_eq!(config.default_destination, "/report.html");
        assert_eq!(config.storage_key, "auth_next");
        assert_eq!(config.provider.anon_key, "anon");
    }
}
