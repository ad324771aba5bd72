//! Typed configuration sections loaded from YAML files with environment
//! overrides.
//!
//! Files are looked up per environment name (`<env>.yaml`, `default.yaml`
//! when no environment is given) and merged in path order. Environment
//! variables of the form `<APPNAME>_<SECTION>_<KEY>` are applied on top, so
//! `MYAPP_DATABASE_HOST=db` overrides `database.host`.

pub mod de;
pub mod file;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("no configuration file named '{name}' found in {paths:?}")]
    NotFound { name: String, paths: Vec<PathBuf> },
    #[error("invalid configuration section '{section}': {source}")]
    Section {
        section: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("configuration read before initialization")]
    NotInitialized,
}

/// Configuration sources for one application.
#[derive(Debug, Clone)]
pub struct Configuration {
    app_name: String,
    env_name: String,
    paths: Vec<PathBuf>,
    root: Option<Mapping>,
}

impl Configuration {
    pub fn new(
        app_name: impl Into<String>,
        env_name: impl Into<String>,
        paths: impl IntoIterator<Item = PathBuf>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            env_name: env_name.into(),
            paths: paths.into_iter().collect(),
            root: None,
        }
    }

    /// Build an already-initialized configuration from a YAML document.
    pub fn from_yaml(app_name: impl Into<String>, yaml: &str) -> Result<Self, ConfigError> {
        let root = parse_document(Path::new("<inline>"), yaml)?;
        Ok(Self {
            app_name: app_name.into(),
            env_name: String::new(),
            paths: Vec::new(),
            root: Some(root),
        })
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    /// Prefix of the environment variables that override file values.
    pub fn env_prefix(&self) -> String {
        self.app_name.to_ascii_uppercase().replace(['-', '.', ' '], "_")
    }

    pub fn is_initialized(&self) -> bool {
        self.root.is_some()
    }

    /// Load files and overlay the process environment.
    pub fn initialize(&mut self) -> Result<(), ConfigError> {
        self.initialize_with_env(std::env::vars())
    }

    /// Load files and overlay the given variables instead of the process
    /// environment. A second call is a no-op.
    pub fn initialize_with_env<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        if self.is_initialized() {
            return Ok(());
        }

        let name = if self.env_name.is_empty() {
            "default"
        } else {
            self.env_name.as_str()
        };

        let mut root = Mapping::new();
        let mut loaded = 0usize;
        for path in &self.paths {
            if let Some(file) = resolve_file(path, name) {
                let content = std::fs::read_to_string(&file).map_err(|source| ConfigError::Io {
                    path: file.clone(),
                    source,
                })?;
                merge(&mut root, parse_document(&file, &content)?);
                debug!(path = %file.display(), "config=loaded");
                loaded += 1;
            }
        }

        if loaded == 0 {
            return Err(ConfigError::NotFound {
                name: name.to_string(),
                paths: self.paths.clone(),
            });
        }

        let overrides = apply_env_overrides(&mut root, &self.env_prefix(), vars);
        info!(
            app = %self.app_name,
            env = %name,
            files = loaded,
            env_overrides = overrides,
            "config=ready"
        );
        self.root = Some(root);
        Ok(())
    }

    /// Deserialize one section (dotted paths such as `server.tls` walk nested
    /// mappings). A missing section deserializes from an empty mapping, so
    /// `#[serde(default)]` fields take their defaults.
    pub fn component<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError> {
        let root = self.root.as_ref().ok_or(ConfigError::NotInitialized)?;

        let mut current: Option<&Value> = None;
        let mut mapping = Some(root);
        for part in section.split('.') {
            current = mapping.and_then(|m| m.get(Value::String(part.to_string())));
            mapping = current.and_then(Value::as_mapping);
        }

        let value = current
            .cloned()
            .unwrap_or_else(|| Value::Mapping(Mapping::new()));
        serde_yaml::from_value(value).map_err(|source| ConfigError::Section {
            section: section.to_string(),
            source,
        })
    }
}

fn resolve_file(path: &Path, name: &str) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    if path.is_dir() {
        return ["yaml", "yml"]
            .iter()
            .map(|ext| path.join(format!("{name}.{ext}")))
            .find(|candidate| candidate.is_file());
    }
    None
}

fn parse_document(path: &Path, content: &str) -> Result<Mapping, ConfigError> {
    let value: Value = serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Mapping(m) => Ok(m),
        Value::Null => Ok(Mapping::new()),
        _ => Err(ConfigError::Parse {
            path: path.to_path_buf(),
            source: serde::de::Error::custom("top level must be a mapping"),
        }),
    }
}

/// Deep-merge `overlay` into `base`; non-mapping values replace.
fn merge(base: &mut Mapping, overlay: Mapping) {
    for (key, value) in overlay {
        if let Value::Mapping(incoming) = value {
            if let Some(Value::Mapping(existing)) = base.get_mut(&key) {
                merge(existing, incoming);
                continue;
            }
            base.insert(key, Value::Mapping(incoming));
        } else {
            base.insert(key, value);
        }
    }
}

fn apply_env_overrides<I>(root: &mut Mapping, prefix: &str, vars: I) -> usize
where
    I: IntoIterator<Item = (String, String)>,
{
    let prefix = format!("{prefix}_");
    let mut applied = 0;

    for (name, raw) in vars {
        let Some(rest) = name.strip_prefix(&prefix) else {
            continue;
        };
        let Some((section, key)) = rest.split_once('_') else {
            continue;
        };
        if section.is_empty() || key.is_empty() {
            continue;
        }

        let section = Value::String(section.to_ascii_lowercase());
        let key = Value::String(key.to_ascii_lowercase());

        if !matches!(root.get(&section), Some(Value::Mapping(_))) {
            root.insert(section.clone(), Value::Mapping(Mapping::new()));
        }
        let Some(Value::Mapping(target)) = root.get_mut(&section) else {
            continue;
        };

        // Keep strings as strings when the file already declares one, so a
        // numeric-looking password does not turn into a number.
        let value = match target.get(&key) {
            Some(Value::String(_)) => Value::String(raw),
            _ => parse_scalar(raw),
        };
        target.insert(key, value);
        applied += 1;
    }

    applied
}

/// Typed only when the typed form renders back to the exact input, so `007`,
/// `1e3` or `True` stay strings and no characters are lost.
fn parse_scalar(raw: String) -> Value {
    let typed = match serde_yaml::from_str::<Value>(&raw) {
        Ok(Value::Bool(b)) => Some((Value::Bool(b), b.to_string())),
        Ok(Value::Number(n)) => Some((Value::Number(n.clone()), n.to_string())),
        _ => None,
    };
    match typed {
        Some((value, rendered)) if rendered == raw => value,
        _ => Value::String(raw),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Db {
        #[serde(default)]
        host: String,
        #[serde(default)]
        port: u16,
        #[serde(default)]
        in_memory: bool,
        #[serde(default)]
        password: String,
    }

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn merge_replaces_scalars_and_recurses_into_mappings() {
        let mut base: Mapping = serde_yaml::from_str("a: {x: 1, y: 2}\nb: 1\n").unwrap();
        let overlay: Mapping = serde_yaml::from_str("a: {y: 3}\nb: [1]\n").unwrap();
        merge(&mut base, overlay);
        let expected: Mapping = serde_yaml::from_str("a: {x: 1, y: 3}\nb: [1]\n").unwrap();
        assert_eq!(base, expected);
    }

    #[test]
    fn env_overrides_parse_scalars() {
        let mut root: Mapping = serde_yaml::from_str("database: {host: a}\n").unwrap();
        let applied = apply_env_overrides(
            &mut root,
            "SVC",
            vars(&[
                ("SVC_DATABASE_HOST", "b"),
                ("SVC_DATABASE_PORT", "6543"),
                ("SVC_DATABASE_IN_MEMORY", "true"),
                ("OTHER_DATABASE_HOST", "ignored"),
                ("SVC_NOKEY", "ignored"),
            ]),
        );
        assert_eq!(applied, 3);

        let db: Db = serde_yaml::from_value(root["database"].clone()).unwrap();
        assert_eq!(
            db,
            Db {
                host: "b".into(),
                port: 6543,
                in_memory: true,
                password: String::new(),
            }
        );
    }

    #[test]
    fn env_override_keeps_declared_strings() {
        let mut root: Mapping = serde_yaml::from_str("database: {password: x}\n").unwrap();
        apply_env_overrides(&mut root, "SVC", vars(&[("SVC_DATABASE_PASSWORD", "1234")]));
        let db: Db = serde_yaml::from_value(root["database"].clone()).unwrap();
        assert_eq!(db.password, "1234");
    }

    #[test]
    fn lossy_scalars_stay_strings() {
        assert_eq!(parse_scalar("6543".into()), Value::from(6543));
        assert_eq!(parse_scalar("false".into()), Value::Bool(false));
        assert_eq!(parse_scalar("007".into()), Value::String("007".into()));
        assert_eq!(parse_scalar("1e3".into()), Value::String("1e3".into()));
        assert_eq!(parse_scalar("True".into()), Value::String("True".into()));
        assert_eq!(parse_scalar("abc".into()), Value::String("abc".into()));
    }

    #[derive(Debug, Deserialize)]
    struct Secret {
        #[serde(default, deserialize_with = "crate::de::scalar_string")]
        password: String,
    }

    #[test]
    fn env_only_numeric_value_binds_to_string_field() {
        let mut root: Mapping = serde_yaml::from_str("database: {db_name: app}\n").unwrap();
        apply_env_overrides(&mut root, "SVC", vars(&[("SVC_DATABASE_PASSWORD", "123456")]));
        let secret: Secret = serde_yaml::from_value(root["database"].clone()).unwrap();
        assert_eq!(secret.password, "123456");
    }

    #[test]
    fn env_prefix_normalizes_app_name() {
        let config = Configuration::new("my-app", "", Vec::new());
        assert_eq!(config.env_prefix(), "MY_APP");
    }

    #[test]
    fn component_before_initialize_fails() {
        let config = Configuration::new("svc", "dev", Vec::new());
        assert!(matches!(
            config.component::<Db>("database"),
            Err(ConfigError::NotInitialized)
        ));
    }

    #[test]
    fn dotted_section_walks_nested_mappings() {
        let config =
            Configuration::from_yaml("svc", "server:\n  tls:\n    host: nested\n").unwrap();
        let db: Db = config.component("server.tls").unwrap();
        assert_eq!(db.host, "nested");
    }

    #[test]
    fn missing_section_uses_defaults() {
        let config = Configuration::from_yaml("svc", "other: {}\n").unwrap();
        let db: Db = config.component("database").unwrap();
        assert_eq!(db.port, 0);
        assert!(!db.in_memory);
    }
}
