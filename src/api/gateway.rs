use crate::turnstile::SiteVerifier;
use secrecy::{ExposeSecret, SecretString};

/// Shared, immutable state behind the verify endpoint.
#[derive(Debug)]
pub struct VerificationGateway {
    secret: Option<SecretString>,
    verifier: SiteVerifier,
}

impl VerificationGateway {
    /// An empty secret counts as not configured.
    #[must_use]
    pub fn new(secret: Option<SecretString>, verifier: SiteVerifier) -> Self {
        let secret = secret.filter(|secret| !secret.expose_secret().is_empty());
        Self { secret, verifier }
    }

    #[must_use]
    pub fn secret(&self) -> Option<&SecretString> {
        self.secret.as_ref()
    }

    #[must_use]
    pub fn verifier(&self) -> &SiteVerifier {
        &self.verifier
    }
}
