//! Generic service bootstrap: startup flags, configuration, logging and the
//! database access layer, brought up in that order.

pub mod args;
pub mod bootstrap;
pub mod error;
pub mod server_config;

pub use args::StartupArgs;
pub use bootstrap::{bootstrap, bootstrap_with, Services};
pub use error::BootstrapError;
pub use server_config::ServerConfig;
