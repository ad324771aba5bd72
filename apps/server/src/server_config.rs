use std::path::{Path, PathBuf};

use configuration::de::scalar_string;
use serde::Deserialize;

use crate::error::BootstrapError;

/// `server` configuration section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    #[serde(deserialize_with = "scalar_string")]
    pub address: String,
    pub tls: bool,
    pub cert_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
}

impl ServerConfig {
    /// `address` is required; with `tls` on, both certificate and key must
    /// be given and exist.
    pub fn validate(&self) -> Result<(), BootstrapError> {
        if self.address.trim().is_empty() {
            return Err(BootstrapError::server("address is required"));
        }
        if self.tls {
            require_file("cert_file", self.cert_file.as_deref())?;
            require_file("key_file", self.key_file.as_deref())?;
        }
        Ok(())
    }
}

fn require_file(key: &str, path: Option<&Path>) -> Result<(), BootstrapError> {
    match path {
        None => Err(BootstrapError::server(format!("{key} is required when tls is enabled"))),
        Some(p) if !p.is_file() => Err(BootstrapError::server(format!(
            "{key} {} does not exist",
            p.display()
        ))),
        Some(_) => Ok(()),
    }
}
