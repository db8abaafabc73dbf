use anyhow::Result;

use consent_server::config::ConsentConfig;
use consent_server::{logging, ConsentServer};

#[tokio::main]
async fn main() -> Result<()> {
    let level = std::env::var("CONSENT_LOG").unwrap_or_else(|_| "info".to_string());
    logging::init_logging(&level);

    let config = ConsentConfig::from_env()?;
    ConsentServer::new(config)?.run().await?;

    Ok(())
}
