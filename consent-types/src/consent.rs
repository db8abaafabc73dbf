use serde::{Deserialize, Serialize};

use crate::errors::ConsentError;

/// A client application's request for user consent.
///
/// Carried as query parameters on the consent entry point, stashed in the
/// session across the login round trip, and re-posted by the consent form.
/// `scopes` is comma-separated on the application surface; the gateway
/// translates it to the space-separated form the provider expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentRequest {
    pub client_id: String,
    pub response_type: String,
    pub scopes: String,
}

impl ConsentRequest {
    pub fn new(
        client_id: impl Into<String>,
        response_type: impl Into<String>,
        scopes: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            response_type: response_type.into(),
            scopes: scopes.into(),
        }
    }

    /// Check that all fields are present and the request asks for the
    /// authorization code grant, the only flow this application supports.
    pub fn validate(&self) -> Result<(), ConsentError> {
        if self.client_id.is_empty() {
            return Err(ConsentError::Validation("missing client_id".to_string()));
        }
        if self.response_type != "code" {
            return Err(ConsentError::Validation(format!(
                "unsupported response_type: '{}' (expected 'code')",
                self.response_type
            )));
        }
        if self.scopes.is_empty() {
            return Err(ConsentError::Validation("missing scopes".to_string()));
        }
        Ok(())
    }

    /// Requested scopes as a list, for display on the consent view.
    pub fn scope_list(&self) -> Vec<String> {
        self.scopes.split(',').map(|s| s.to_string()).collect()
    }

    /// Scopes in the space-separated form the provider's authorize
    /// endpoint expects.
    pub fn provider_scope(&self) -> String {
        self.scopes.replace(',', " ")
    }

    /// Rebuild the consent entry-point URI carrying this request, used to
    /// resume the flow after login.
    pub fn consent_uri(&self) -> String {
        let query = serde_urlencoded::to_string(self).unwrap_or_default();
        format!("/consent?{}", query)
    }
}
