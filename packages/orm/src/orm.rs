use std::sync::Arc;

use logging::Log;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::config::OrmConfig;
use crate::db::Database;
use crate::dialector::{conn_id, sanitize_db_url, Dialector};
use crate::engine_log::EngineLogLevel;
use crate::error::OrmError;
use crate::naming::{DefaultNamingStrategy, NamingStrategy};
use crate::options::OrmOptions;
use crate::schema::{Model, ModelDescriptor, Schema};

/// Database access layer.
///
/// Constructed idle; [`Orm::initialize`] opens the connection exactly once and
/// [`Orm::finalize`] releases it.
#[derive(Debug)]
pub struct Orm {
    config: OrmConfig,
    log: Arc<Log>,
    naming: Arc<dyn NamingStrategy>,
    options: OrmOptions,
    db: OnceCell<Database>,
}

impl Orm {
    pub fn new(config: OrmConfig, log: Arc<Log>) -> Self {
        let naming = Arc::new(config.naming_strategy());
        Self {
            config,
            log,
            naming,
            options: OrmOptions::default(),
            db: OnceCell::new(),
        }
    }

    pub fn with_naming_strategy(mut self, naming: Arc<dyn NamingStrategy>) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_options(mut self, options: OrmOptions) -> Self {
        self.options = options;
        self
    }

    pub fn config(&self) -> &OrmConfig {
        &self.config
    }

    pub fn logging_enabled(&self) -> bool {
        self.config.enable_logging
    }

    /// Masked connection string of the open connection.
    pub fn connection_string(&self) -> Option<&str> {
        self.db.get().map(Database::dsn)
    }

    /// Open the connection. Calling this again once it succeeded is a no-op;
    /// concurrent callers share a single open.
    pub async fn initialize(&self) -> Result<(), OrmError> {
        if self.is_initialized() {
            return Ok(());
        }

        info!("orm=init_start");
        let result = self.db.get_or_try_init(|| self.open()).await.map(|_| ());
        info!(ok = result.is_ok(), "orm=init_end");
        result
    }

    async fn open(&self) -> Result<Database, OrmError> {
        let dialector = Dialector::from_config(&self.config)?;
        let dsn = dialector.connection_string();
        let sanitized = sanitize_db_url(&dsn);
        let engine_level = EngineLogLevel::from_severity(self.log.level());

        if dialector == Dialector::SqliteMemory {
            info!("orm=in_memory using SQLite in-memory database");
        }
        info!(
            engine = dialector.engine(),
            conn_id = %conn_id(&dsn),
            dsn = %sanitized,
            engine_log = ?engine_level,
            logging = self.config.enable_logging,
            "orm=open"
        );

        let mut options = dialector.connect_options(&self.config);
        engine_level.apply(&mut options, self.config.enable_logging);

        let conn = dialector
            .open(options, self.config.connect_attempts)
            .await
            .map_err(|source| {
                error!(error = %source, dsn = %sanitized, "orm=open_failed");
                OrmError::Open { source }
            })?;

        Ok(Database::new(
            conn,
            sanitized,
            Arc::clone(&self.naming),
            self.options,
        ))
    }

    pub fn is_initialized(&self) -> bool {
        self.db.initialized()
    }

    /// Close the connection. Fails with [`OrmError::NotInitialized`] when
    /// there is nothing to close.
    pub async fn finalize(&mut self) -> Result<(), OrmError> {
        let db = self.db.take().ok_or(OrmError::NotInitialized)?;
        info!("orm=finalize");
        db.close().await.map_err(|source| OrmError::Close { source })
    }

    /// # Panics
    ///
    /// Panics if the ORM is not initialized.
    pub fn get_db(&self) -> &Database {
        match self.db.get() {
            Some(db) => db,
            None => panic!("Trying to access uninitialized ORM object."),
        }
    }

    /// Table name of a model. Before initialization the default naming
    /// strategy is used.
    pub fn table_name(&self, descriptor: &ModelDescriptor) -> String {
        match self.db.get() {
            Some(db) => db.parse(descriptor).table.clone(),
            None => Schema::parse(descriptor, &DefaultNamingStrategy::default()).table,
        }
    }

    pub fn table_name_of<M: Model>(&self) -> String {
        self.table_name(&M::descriptor())
    }

    /// Column names of the public fields, in declaration order.
    ///
    /// # Panics
    ///
    /// Panics if the ORM is not initialized.
    pub fn column_names(&self, descriptor: &ModelDescriptor) -> Vec<String> {
        self.get_db().parse(descriptor).column_names()
    }
}
