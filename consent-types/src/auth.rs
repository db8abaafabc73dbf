use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A set of user credentials submitted by the login form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Collaborator that decides whether a credential pair identifies a
/// resource owner.
///
/// On success it yields the stable `authenticated_userid` the provider
/// binds the issued authorization code to; credential verification itself
/// lives behind this seam.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn verify(&self, credentials: &Credentials) -> Option<String>;
}
