use std::sync::Arc;

use configuration::Configuration;
use logging::{Log, LogConfig};
use orm::{Migrator, ModelDescriptor, Orm, OrmConfig};
use tracing::info;

use crate::args::StartupArgs;
use crate::error::BootstrapError;
use crate::server_config::ServerConfig;

/// Everything a running service holds on to.
#[derive(Debug)]
pub struct Services {
    pub config: Configuration,
    pub log: Arc<Log>,
    pub orm: Orm,
    pub server: ServerConfig,
}

impl Services {
    /// Release the database connection.
    pub async fn shutdown(mut self) -> Result<(), BootstrapError> {
        self.orm.finalize().await?;
        info!(app = self.config.app_name(), "server=stopped");
        Ok(())
    }
}

/// Load configuration from the startup flags, then bring up the services.
pub async fn bootstrap(
    args: &StartupArgs,
    models: &[ModelDescriptor],
) -> Result<Services, BootstrapError> {
    let mut config = Configuration::new(&args.app_name, &args.env, args.config.clone());
    config.initialize()?;
    bootstrap_with(config, args.migrate, models).await
}

/// Bring up logging, validate the server section, open the database and
/// optionally migrate `models`. Any failure aborts startup.
pub async fn bootstrap_with(
    config: Configuration,
    migrate: bool,
    models: &[ModelDescriptor],
) -> Result<Services, BootstrapError> {
    let log_config: LogConfig = config.component("log")?;
    let log = Arc::new(Log::new(log_config));
    log.initialize()?;

    let server: ServerConfig = config.component("server")?;
    server.validate()?;

    let orm_config: OrmConfig = config.component("database")?;
    let orm = Orm::new(orm_config, Arc::clone(&log));
    orm.initialize().await?;

    if migrate {
        info!(models = models.len(), "server=migrate");
        Migrator::new(&orm, models.iter().cloned())
            .initialize()
            .await?;
    }

    info!(
        app = config.app_name(),
        env = config.env_name(),
        address = %server.address,
        tls = server.tls,
        "server=ready"
    );

    Ok(Services {
        config,
        log,
        orm,
        server,
    })
}
