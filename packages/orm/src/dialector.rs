use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sea_orm::{ConnectOptions, DatabaseBackend, DatabaseConnection, DbErr};
use tracing::{info, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::config::OrmConfig;
use crate::error::OrmError;

pub const SQLITE_MEMORY_DSN: &str = "sqlite::memory:";

/// Maximum lifetime of a pooled connection.
pub const CONN_MAX_LIFETIME: Duration = Duration::from_secs(60 * 60);

/// Idle timeout and lifetime of the in-memory connection. Closing that
/// connection drops the database, so both are set far beyond any process
/// lifetime; left unset, the pool would apply its own short defaults.
pub const MEMORY_CONN_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

const RETRY_INTERVAL_MS: u64 = 500;

/// RFC 3986 unreserved characters pass through; everything else is escaped.
const URL_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Which engine to open, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialector {
    SqliteMemory,
    SqliteFile(PathBuf),
    Postgres(String),
}

impl Dialector {
    pub fn from_config(config: &OrmConfig) -> Result<Self, OrmError> {
        if config.in_memory {
            return Ok(Dialector::SqliteMemory);
        }
        if let Some(path) = &config.sqlite_file {
            return Ok(Dialector::SqliteFile(path.clone()));
        }
        postgres_url(config).map(Dialector::Postgres)
    }

    pub fn engine(&self) -> &'static str {
        match self {
            Dialector::SqliteMemory | Dialector::SqliteFile(_) => "sqlite",
            Dialector::Postgres(_) => "postgres",
        }
    }

    pub fn backend(&self) -> DatabaseBackend {
        match self {
            Dialector::SqliteMemory | Dialector::SqliteFile(_) => DatabaseBackend::Sqlite,
            Dialector::Postgres(_) => DatabaseBackend::Postgres,
        }
    }

    pub fn connection_string(&self) -> String {
        match self {
            Dialector::SqliteMemory => SQLITE_MEMORY_DSN.to_string(),
            Dialector::SqliteFile(path) => format!("sqlite://{}?mode=rwc", path.display()),
            Dialector::Postgres(url) => url.clone(),
        }
    }

    /// Pool options for this target.
    ///
    /// An in-memory database lives and dies with its single connection, so
    /// that pool is pinned to one connection and never recycled.
    pub fn connect_options(&self, config: &OrmConfig) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.connection_string());
        match self {
            Dialector::SqliteMemory => {
                options
                    .min_connections(1)
                    .max_connections(1)
                    .idle_timeout(MEMORY_CONN_TTL)
                    .max_lifetime(MEMORY_CONN_TTL);
            }
            Dialector::SqliteFile(_) | Dialector::Postgres(_) => {
                let max = config
                    .max_connections
                    .unwrap_or_else(|| (num_cpus::get() as u32 * 2).max(2));
                options
                    .min_connections(1)
                    .max_connections(max)
                    .max_lifetime(CONN_MAX_LIFETIME);
            }
        }
        if let Some(secs) = config.connect_timeout_secs {
            options.acquire_timeout(Duration::from_secs(secs));
        }
        options
    }

    /// Open the pool. Networked targets are retried up to `max_attempts`
    /// times; SQLite gets a single attempt.
    pub async fn open(
        &self,
        options: ConnectOptions,
        max_attempts: u32,
    ) -> Result<DatabaseConnection, DbErr> {
        let attempts = match self {
            Dialector::Postgres(_) => max_attempts.max(1),
            Dialector::SqliteMemory | Dialector::SqliteFile(_) => 1,
        };
        retry_connection(
            || sea_orm::Database::connect(options.clone()),
            attempts,
            RETRY_INTERVAL_MS,
        )
        .await
    }
}

/// Retry a connection attempt with fixed interval delays.
/// Returns the error of the last attempt once all attempts are exhausted.
async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval_ms: u64,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        match connect_fn().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(
                        "connection_retry=success attempts={} interval_ms={}",
                        attempt, interval_ms
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                if attempt < max_attempts {
                    warn!(
                        error = %e,
                        "connection_retry=failed attempt={} max_attempts={} interval_ms={}",
                        attempt, max_attempts, interval_ms
                    );
                    tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| DbErr::Custom("no connection attempt was made".into())))
}

fn postgres_url(config: &OrmConfig) -> Result<String, OrmError> {
    if config.db_name.is_empty() {
        return Err(OrmError::config("db_name is required for a networked database"));
    }
    let password = config.resolve_password()?;
    let host = if config.host.is_empty() {
        "localhost"
    } else {
        config.host.as_str()
    };

    let mut url = String::from("postgres://");
    if !config.db_user.is_empty() {
        url.push_str(&encode(&config.db_user));
        if !password.is_empty() {
            url.push(':');
            url.push_str(&encode(&password));
        }
        url.push('@');
    }
    url.push_str(&format!("{host}:{}/{}", config.port, encode(&config.db_name)));

    let params = query_params(&config.connection_params);
    if !params.is_empty() {
        url.push('?');
        url.push_str(&params);
    }
    Ok(url)
}

fn encode(component: &str) -> String {
    utf8_percent_encode(component, URL_COMPONENT).to_string()
}

/// `sslmode=disable connect_timeout=5` and `sslmode=disable&connect_timeout=5`
/// both become `sslmode=disable&connect_timeout=5`.
fn query_params(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('?')
        .split(|c: char| c.is_whitespace() || c == '&')
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("&")
}

/// Mask the password of a connection URL for logging.
pub fn sanitize_db_url(url: &str) -> String {
    let Some((auth_part, host_part)) = url.rsplit_once('@') else {
        return url.to_string();
    };
    let Some((scheme, user_info)) = auth_part.split_once("://") else {
        return url.to_string();
    };
    match user_info.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host_part}"),
        None => url.to_string(),
    }
}

/// Short, stable identifier for a connection string, used to correlate log
/// lines without printing the target.
pub fn conn_id(url: &str) -> String {
    format!("{:016x}", xxh3_64(url.as_bytes()))
}
