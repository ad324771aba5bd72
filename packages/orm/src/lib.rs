//! Database access layer: connection lifecycle, naming resolution and
//! additive schema migration on top of `sea-orm`.

pub mod config;
pub mod db;
pub mod diagnostics;
pub mod dialector;
pub mod engine_log;
pub mod error;
pub mod migrator;
pub mod naming;
pub mod options;
pub mod orm;
pub mod schema;

pub use config::OrmConfig;
pub use db::Database;
pub use dialector::Dialector;
pub use engine_log::EngineLogLevel;
pub use error::{is_record_not_found_error, new_record_not_found_error, OrmError};
pub use migrator::Migrator;
pub use naming::{DefaultNamingStrategy, NamingStrategy};
pub use options::OrmOptions;
pub use orm::Orm;
pub use schema::{
    ColumnKind, Field, FieldDescriptor, ForeignKeyRef, Model, ModelDescriptor, Record, Schema,
    Visibility,
};

pub use sea_orm;
