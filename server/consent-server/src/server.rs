use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use tracing::info;

use consent_types::{Authenticator, ConsentError};

use crate::auth::StaticAuthenticator;
use crate::config::ConsentConfig;
use crate::gateway::GatewayClient;
use crate::handlers::{self, ConsentFlowState};
use crate::session::SessionStore;

/// HTTP server hosting the consent flow.
pub struct ConsentServer {
    bind_addr: String,
    state: ConsentFlowState,
}

impl ConsentServer {
    pub fn new(config: ConsentConfig) -> Result<Self, ConsentError> {
        let gateway = Arc::new(GatewayClient::new(&config)?);
        let sessions = Arc::new(SessionStore::new(config.session_ttl_secs));
        let bind_addr = config.bind_addr.clone();

        let state = ConsentFlowState {
            config: Arc::new(config),
            sessions,
            gateway,
            authenticator: Arc::new(StaticAuthenticator::default()),
        };

        Ok(Self { bind_addr, state })
    }

    /// Replace the demo authenticator with a real credential verifier.
    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.state.authenticator = authenticator;
        self
    }

    pub async fn run(&self) -> Result<(), ConsentError> {
        info!("Starting consent server on {}", self.bind_addr);

        let state = self.state.clone();
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::default())
                .app_data(web::Data::new(state.clone()))
                .configure(handlers::routes)
        })
        .bind(&self.bind_addr)
        .map_err(|e| ConsentError::Server(format!("Failed to bind to {}: {}", self.bind_addr, e)))?
        .run()
        .await
        .map_err(|e| ConsentError::Server(format!("Server error: {}", e)))
    }
}
