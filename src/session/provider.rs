use crate::session::config::ProviderConfig;
use async_trait::async_trait;
use secrecy::SecretString;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
    #[error("identity provider rejected the request: {0}")]
    Rejected(String),
}

/// Session handle as issued by the identity provider. The guard only checks
/// whether one exists.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub access_token: SecretString,
    pub expires_at: Option<i64>,
}

impl Session {
    #[must_use]
    pub fn new(user_id: impl Into<String>, access_token: SecretString) -> Self {
        Self {
            user_id: user_id.into(),
            access_token,
            expires_at: None,
        }
    }
}

/// Kinds of change the provider notifies about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
}

/// Client handle of the identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Current session, if any.
    async fn get_session(&self) -> Result<Option<Session>, ProviderError>;

    /// Stream of session changes for the lifetime of the client.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;

    async fn sign_out(&self) -> Result<(), ProviderError>;
}

/// The provider's client library, as loaded by the host page.
pub trait ProviderFactory: Send + Sync {
    fn create_client(&self, config: &ProviderConfig) -> Arc<dyn IdentityProvider>;
}
