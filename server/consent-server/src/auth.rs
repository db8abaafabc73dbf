use async_trait::async_trait;

use consent_types::{Authenticator, Credentials};

/// Identifier under which the demo resource owner is known to the provider.
pub const DEFAULT_AUTHENTICATED_USERID: &str = "client-userid";

/// Demo authenticator accepting any non-empty credential pair.
///
/// Real credential verification belongs to an external system behind the
/// `Authenticator` seam; this stand-in resolves every successful login to a
/// single fixed resource owner.
pub struct StaticAuthenticator {
    authenticated_userid: String,
}

impl StaticAuthenticator {
    pub fn new(authenticated_userid: impl Into<String>) -> Self {
        Self {
            authenticated_userid: authenticated_userid.into(),
        }
    }
}

impl Default for StaticAuthenticator {
    fn default() -> Self {
        Self::new(DEFAULT_AUTHENTICATED_USERID)
    }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn verify(&self, credentials: &Credentials) -> Option<String> {
        if credentials.username.is_empty() || credentials.password.is_empty() {
            return None;
        }
        Some(self.authenticated_userid.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn non_empty_credentials_resolve_to_the_demo_user() {
        let authenticator = StaticAuthenticator::default();
        let credentials = Credentials {
            username: "jdoe".to_string(),
            password: "secret".to_string(),
        };
        assert_eq!(
            authenticator.verify(&credentials).await.as_deref(),
            Some(DEFAULT_AUTHENTICATED_USERID)
        );
    }

    #[tokio::test]
    async fn empty_credentials_are_rejected() {
        let authenticator = StaticAuthenticator::default();
        let credentials = Credentials::default();
        assert!(authenticator.verify(&credentials).await.is_none());
    }
}
