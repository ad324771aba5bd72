use configuration::ConfigError;
use logging::LogError;
use orm::OrmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Log(#[from] LogError),
    #[error(transparent)]
    Orm(#[from] OrmError),
    #[error("invalid server configuration: {message}")]
    Server { message: String },
}

impl BootstrapError {
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }
}
