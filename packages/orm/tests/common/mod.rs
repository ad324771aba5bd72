#![allow(dead_code)]

use std::sync::Arc;

use logging::{Log, Severity};
use orm::sea_orm::FromQueryResult;
use orm::{ColumnKind, FieldDescriptor, Model, ModelDescriptor, Orm, OrmConfig, Record};
use orm::sea_orm::Value;

#[ctor::ctor]
fn init_logging() {
    test_support::logging::init();
}

pub fn test_log() -> Arc<Log> {
    Arc::new(Log::with_level(Severity::Info))
}

pub fn in_memory_config() -> OrmConfig {
    OrmConfig::in_memory()
}

pub async fn initialized_orm() -> Orm {
    let orm = Orm::new(in_memory_config(), test_log());
    orm.initialize().await.expect("in-memory ORM should initialize");
    orm
}

#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct TestModel {
    pub name: String,
}

impl Model for TestModel {
    fn descriptor() -> ModelDescriptor {
        ModelDescriptor::new("TestModel").field(FieldDescriptor::new("Name", ColumnKind::Text))
    }
}

impl Record for TestModel {
    fn values(&self) -> Vec<Value> {
        vec![self.name.clone().into()]
    }
}

#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct TestMigrationModel {
    pub id: i32,
    pub name: String,
    pub score: Option<i64>,
}

impl Model for TestMigrationModel {
    fn descriptor() -> ModelDescriptor {
        ModelDescriptor::new("TestMigrationModel")
            .field(
                FieldDescriptor::new("ID", ColumnKind::Integer)
                    .primary_key()
                    .auto_increment(),
            )
            .field(FieldDescriptor::new("Name", ColumnKind::String(Some(64))))
            .field(FieldDescriptor::new("Score", ColumnKind::BigInteger).nullable())
            .field(FieldDescriptor::new("cache", ColumnKind::Text).private())
    }
}

impl Record for TestMigrationModel {
    fn values(&self) -> Vec<Value> {
        vec![self.id.into(), self.name.clone().into(), self.score.into()]
    }
}
