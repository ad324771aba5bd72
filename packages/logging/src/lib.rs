//! Leveled structured logging shared by the service components.
//!
//! A [`Log`] is built from a [`LogConfig`] section, installs the global
//! `tracing` subscriber once, and answers "what severity is configured" for
//! components (such as the ORM) that need to align their own log sinks.

mod severity;

use once_cell::sync::OnceCell;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub use severity::{ParseSeverityError, Severity};

static INSTALLED: OnceCell<()> = OnceCell::new();

#[derive(Debug, Error)]
pub enum LogError {
    #[error("invalid log filter '{directives}': {message}")]
    Filter { directives: String, message: String },
}

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// `log` configuration section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub level: Severity,
    #[serde(default)]
    pub format: LogFormat,
    /// Extra `EnvFilter` directives appended after the base level,
    /// e.g. `"sqlx=warn,sea_orm=info"`.
    #[serde(default)]
    pub filter: Option<String>,
}

/// Handle on the service logger.
#[derive(Debug, Clone)]
pub struct Log {
    config: LogConfig,
}

impl Log {
    pub fn new(config: LogConfig) -> Self {
        Self { config }
    }

    /// Convenience constructor used by tools and tests.
    pub fn with_level(level: Severity) -> Self {
        Self::new(LogConfig {
            level,
            ..LogConfig::default()
        })
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Currently configured severity.
    pub fn level(&self) -> Severity {
        self.config.level
    }

    /// Filter directives derived from the configuration.
    pub fn directives(&self) -> String {
        let base = self.config.level.level_filter().to_string().to_lowercase();
        match self.config.filter.as_deref().map(str::trim) {
            Some(extra) if !extra.is_empty() => format!("{base},{extra}"),
            _ => base,
        }
    }

    /// Install the global subscriber.
    ///
    /// Idempotent: the first successful call wins and later calls (from this
    /// or any other `Log`) return `Ok(())` without touching the subscriber.
    pub fn initialize(&self) -> Result<(), LogError> {
        let directives = self.directives();
        let env_filter =
            EnvFilter::try_new(&directives).map_err(|e| LogError::Filter {
                directives: directives.clone(),
                message: e.to_string(),
            })?;

        INSTALLED.get_or_init(|| {
            let registry = tracing_subscriber::registry().with(env_filter);
            let installed = match self.config.format {
                LogFormat::Json => registry
                    .with(fmt::layer().with_target(false).with_ansi(false).json())
                    .try_init(),
                LogFormat::Text => registry.with(fmt::layer().with_target(false)).try_init(),
            };
            // Someone else (a test harness, an embedding binary) already owns
            // the global subscriber; keep theirs.
            if installed.is_err() {
                debug!("log=init skipped reason=subscriber_already_set");
            }
        });

        debug!(level = %self.level(), directives = %directives, "log=ready");
        Ok(())
    }
}
