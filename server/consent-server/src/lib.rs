pub mod auth;
pub mod config;
pub mod gateway;
pub mod handlers;
pub mod logging;
pub mod session;
pub mod views;

mod server;

pub use server::ConsentServer;

pub use handlers::ConsentFlowState;
