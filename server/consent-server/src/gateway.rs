use std::collections::HashMap;
use std::time::Duration;

use reqwest::{header::CONTENT_TYPE, Client};
use serde::Deserialize;

use consent_types::{ConsentError, ConsentRequest, GatewayError};

use crate::config::ConsentConfig;

const USER_AGENT: &str = "oauth2-consent-app";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Partial representation of the provider's OAuth2 credential resource.
#[derive(Debug, Deserialize)]
struct OAuth2Credential {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OAuth2Credentials {
    data: Vec<OAuth2Credential>,
}

/// Partial representation of the response from the provider's
/// `/oauth2/authorize` endpoint.
#[derive(Debug, Deserialize)]
struct AuthorizeResponse {
    redirect_uri: String,
}

/// Outbound client for the two protocol operations against the
/// authorization provider: application-name lookup on the admin interface
/// and authorization-code issuance on the proxy interface.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    admin_endpoint: String,
    proxy_endpoint: String,
    api_path: String,
    provision_key: String,
    http_client: Client,
}

impl GatewayClient {
    pub fn new(config: &ConsentConfig) -> Result<Self, ConsentError> {
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT);
        if config.insecure_tls {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http_client = builder
            .build()
            .map_err(|e| ConsentError::Server(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            admin_endpoint: config.admin_endpoint.clone(),
            proxy_endpoint: config.proxy_endpoint.clone(),
            api_path: config.api_path.clone(),
            provision_key: config.provision_key.clone(),
            http_client,
        })
    }

    /// Query the provider's OAuth2 credentials filtered by client id and
    /// return the registered application's display name.
    pub async fn resolve_application_name(&self, client_id: &str) -> Result<String, GatewayError> {
        let url = format!("{}/oauth2", self.admin_endpoint);

        let response = self
            .http_client
            .get(&url)
            .query(&[("client_id", client_id)])
            .send()
            .await
            .map_err(|e| GatewayError::Transport(format!("credential lookup failed: {}", e)))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(GatewayError::Protocol(format!(
                "credential lookup failed with status {}: {}",
                status, response_text
            )));
        }

        let credentials: OAuth2Credentials = serde_json::from_str(&response_text).map_err(|e| {
            GatewayError::Protocol(format!("failed to parse credential response: {}", e))
        })?;

        credentials
            .data
            .into_iter()
            .next()
            .map(|credential| credential.name)
            .ok_or_else(|| GatewayError::NotFound(client_id.to_string()))
    }

    /// Request an authorization code from the provider's authorize endpoint.
    ///
    /// The provider answers 200 for a granted code and 400 for a
    /// protocol-level denial, but encodes both outcomes inside the returned
    /// `redirect_uri`, so the status code is not consulted here: whatever
    /// URI comes back is handed to the caller verbatim. Only an undecodable
    /// body or a failed call is an error.
    pub async fn issue_authorization_code(
        &self,
        consent: &ConsentRequest,
        authenticated_userid: &str,
    ) -> Result<String, GatewayError> {
        let authorize_url = format!("{}{}/oauth2/authorize", self.proxy_endpoint, self.api_path);

        let scope = consent.provider_scope();
        let mut form_data = HashMap::new();
        form_data.insert("client_id", consent.client_id.as_str());
        form_data.insert("response_type", consent.response_type.as_str());
        form_data.insert("scope", scope.as_str());
        form_data.insert("provision_key", self.provision_key.as_str());
        form_data.insert("authenticated_userid", authenticated_userid);

        let response = self
            .http_client
            .post(&authorize_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&form_data)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(format!("authorize request failed: {}", e)))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(format!("failed to read response: {}", e)))?;

        let authorize: AuthorizeResponse = serde_json::from_str(&response_text).map_err(|_| {
            GatewayError::Protocol(format!(
                "authorize response with status {} could not be decoded: {}",
                status, response_text
            ))
        })?;

        Ok(authorize.redirect_uri)
    }
}
