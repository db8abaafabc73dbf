/// Failures from the two outbound gateway calls against the authorization
/// provider.
///
/// `NotFound` and `Protocol` cover responses that arrived but could not be
/// used; `Transport` covers calls that never completed. A provider-declined
/// consent is not an error: the authorize endpoint encodes denial inside a
/// successfully returned redirect URI.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("no OAuth2 credential registered for client_id: {0}")]
    NotFound(String),
    #[error("unexpected provider response: {0}")]
    Protocol(String),
    #[error("provider request failed: {0}")]
    Transport(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConsentError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("Server error: {0}")]
    Server(String),
}
