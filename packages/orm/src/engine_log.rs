//! Alignment of the driver's statement logging with the service logger.

use std::time::Duration;

use log::LevelFilter;
use logging::Severity;
use sea_orm::ConnectOptions;

/// Statements slower than this are reported at `warn`.
pub const SLOW_STATEMENT_THRESHOLD: Duration = Duration::from_millis(200);

/// Verbosity vocabulary of the engine's own logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineLogLevel {
    /// Nothing but failures; statements are not logged.
    Error,
    /// Slow statements only.
    Warn,
    /// Every statement, plus slow statements at `warn`.
    Info,
}

impl EngineLogLevel {
    /// `panic`, `fatal` and `error` all collapse to `Error`; `warn` maps to
    /// `Warn`; anything more verbose maps to `Info`.
    pub fn from_severity(severity: Severity) -> Self {
        match severity {
            Severity::Panic | Severity::Fatal | Severity::Error => EngineLogLevel::Error,
            Severity::Warn => EngineLogLevel::Warn,
            Severity::Info | Severity::Debug | Severity::Trace => EngineLogLevel::Info,
        }
    }

    /// Level at which ordinary statements are emitted.
    pub fn statement_filter(&self) -> LevelFilter {
        match self {
            EngineLogLevel::Error | EngineLogLevel::Warn => LevelFilter::Off,
            EngineLogLevel::Info => LevelFilter::Info,
        }
    }

    /// Level at which slow statements are emitted.
    pub fn slow_statement_filter(&self) -> LevelFilter {
        match self {
            EngineLogLevel::Error => LevelFilter::Off,
            EngineLogLevel::Warn | EngineLogLevel::Info => LevelFilter::Warn,
        }
    }

    /// Attach this level to the connect options. With `enabled == false` the
    /// driver's logging is switched off entirely.
    pub fn apply(&self, options: &mut ConnectOptions, enabled: bool) {
        options.sqlx_logging(enabled && *self != EngineLogLevel::Error);
        options.sqlx_logging_level(self.statement_filter());
        options.sqlx_slow_statements_logging_settings(
            self.slow_statement_filter(),
            SLOW_STATEMENT_THRESHOLD,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severe_levels_collapse_to_error() {
        for severity in [Severity::Panic, Severity::Fatal, Severity::Error] {
            assert_eq!(EngineLogLevel::from_severity(severity), EngineLogLevel::Error);
        }
    }

    #[test]
    fn warn_maps_to_warn() {
        assert_eq!(EngineLogLevel::from_severity(Severity::Warn), EngineLogLevel::Warn);
    }

    #[test]
    fn verbose_levels_map_to_info() {
        for severity in [Severity::Info, Severity::Debug, Severity::Trace] {
            assert_eq!(EngineLogLevel::from_severity(severity), EngineLogLevel::Info);
        }
    }

    #[test]
    fn filters_follow_level() {
        assert_eq!(EngineLogLevel::Error.statement_filter(), LevelFilter::Off);
        assert_eq!(EngineLogLevel::Error.slow_statement_filter(), LevelFilter::Off);
        assert_eq!(EngineLogLevel::Warn.statement_filter(), LevelFilter::Off);
        assert_eq!(EngineLogLevel::Warn.slow_statement_filter(), LevelFilter::Warn);
        assert_eq!(EngineLogLevel::Info.statement_filter(), LevelFilter::Info);
    }
}
