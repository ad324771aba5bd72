use std::path::PathBuf;

use configuration::de::scalar_string;
use serde::Deserialize;

use crate::error::OrmError;
use crate::naming::DefaultNamingStrategy;

pub const DEFAULT_PG_PORT: u16 = 5432;
pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 5;

/// `database` configuration section.
///
/// With `in_memory` set, every other connection field is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrmConfig {
    pub in_memory: bool,
    /// File-backed SQLite database, used when not in memory.
    pub sqlite_file: Option<PathBuf>,
    #[serde(deserialize_with = "scalar_string")]
    pub host: String,
    pub port: u16,
    #[serde(deserialize_with = "scalar_string")]
    pub db_name: String,
    #[serde(deserialize_with = "scalar_string")]
    pub db_user: String,
    #[serde(deserialize_with = "scalar_string")]
    pub db_password: String,
    /// Read the password from the first line of this file instead of
    /// `db_password`.
    pub db_password_file: Option<PathBuf>,
    /// Extra driver parameters, either libpq style (`sslmode=disable
    /// connect_timeout=5`) or a query string.
    #[serde(deserialize_with = "scalar_string")]
    pub connection_params: String,
    pub enable_logging: bool,
    #[serde(deserialize_with = "scalar_string")]
    pub table_prefix: String,
    pub singular_table: bool,
    pub max_connections: Option<u32>,
    /// Seconds to wait for a pooled connection before giving up.
    pub connect_timeout_secs: Option<u64>,
    pub connect_attempts: u32,
}

impl Default for OrmConfig {
    fn default() -> Self {
        Self {
            in_memory: false,
            sqlite_file: None,
            host: "localhost".to_string(),
            port: DEFAULT_PG_PORT,
            db_name: String::new(),
            db_user: String::new(),
            db_password: String::new(),
            db_password_file: None,
            connection_params: String::new(),
            enable_logging: false,
            table_prefix: String::new(),
            singular_table: false,
            max_connections: None,
            connect_timeout_secs: None,
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
        }
    }
}

impl OrmConfig {
    pub fn in_memory() -> Self {
        Self {
            in_memory: true,
            ..Self::default()
        }
    }

    pub fn sqlite_file(path: impl Into<PathBuf>) -> Self {
        Self {
            sqlite_file: Some(path.into()),
            ..Self::default()
        }
    }

    /// Password to use, preferring `db_password_file` when set.
    pub fn resolve_password(&self) -> Result<String, OrmError> {
        match &self.db_password_file {
            Some(path) => configuration::file::read_first_line(path).map_err(|e| {
                OrmError::config(format!(
                    "failed to read password file {}: {e}",
                    path.display()
                ))
            }),
            None => Ok(self.db_password.clone()),
        }
    }

    pub fn naming_strategy(&self) -> DefaultNamingStrategy {
        DefaultNamingStrategy {
            table_prefix: self.table_prefix.clone(),
            singular_table: self.singular_table,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn section_defaults_fill_missing_keys() {
        let config: OrmConfig = serde_yaml::from_str("in_memory: true\n").unwrap();
        assert!(config.in_memory);
        assert_eq!(config.port, DEFAULT_PG_PORT);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.connect_attempts, DEFAULT_CONNECT_ATTEMPTS);
    }

    #[test]
    fn full_section_deserializes() {
        let yaml = "\
host: db.internal
port: 6432
db_name: orders
db_user: svc
db_password: s3cret
connection_params: sslmode=disable
enable_logging: true
table_prefix: app_
singular_table: true
max_connections: 8
";
        let config: OrmConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 6432);
        assert_eq!(config.db_name, "orders");
        assert_eq!(config.connection_params, "sslmode=disable");
        assert!(config.enable_logging);
        assert_eq!(config.max_connections, Some(8));
        let naming = config.naming_strategy();
        assert_eq!(naming.table_prefix, "app_");
        assert!(naming.singular_table);
    }

    #[test]
    fn env_only_numeric_credentials_bind_as_text() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("default.yaml"), "database:\n  db_name: app\n").unwrap();
        let mut config = configuration::Configuration::new("svc", "", vec![dir.path().to_path_buf()]);
        config
            .initialize_with_env(vec![
                ("SVC_DATABASE_DB_PASSWORD".to_string(), "123456".to_string()),
                ("SVC_DATABASE_DB_USER".to_string(), "42".to_string()),
                ("SVC_DATABASE_PORT".to_string(), "6432".to_string()),
            ])
            .unwrap();

        let orm: OrmConfig = config.component("database").unwrap();
        assert_eq!(orm.db_name, "app");
        assert_eq!(orm.db_password, "123456");
        assert_eq!(orm.db_user, "42");
        assert_eq!(orm.port, 6432);
    }

    #[test]
    fn password_file_wins_over_inline_password() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "from-file").unwrap();
        let config = OrmConfig {
            db_password: "inline".into(),
            db_password_file: Some(f.path().to_path_buf()),
            ..OrmConfig::default()
        };
        assert_eq!(config.resolve_password().unwrap(), "from-file");
    }

    #[test]
    fn unreadable_password_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = OrmConfig {
            db_password_file: Some(dir.path().join("missing")),
            ..OrmConfig::default()
        };
        assert!(matches!(
            config.resolve_password(),
            Err(OrmError::Config { .. })
        ));
    }
}
