//! HTTP service and command-line front end for the episode engine.
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod effects;
pub mod routes;
pub mod session;

pub use app::ServerState;
pub use config::ServerConfig;
pub use routes::router;
