use sea_orm::sea_query::{Alias, ColumnDef, ForeignKey, Table, TableAlterStatement, TableCreateStatement};
use sea_orm::{DbErr, TransactionTrait};
use sea_orm_migration::SchemaManager;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::db::{ensure_columns, Database};
use crate::diagnostics::migration_counters;
use crate::error::OrmError;
use crate::options::OrmOptions;
use crate::orm::Orm;
use crate::schema::{ColumnKind, Field, ModelDescriptor, Schema};

/// Additive schema migration for a fixed set of models.
///
/// Missing tables are created and missing columns added; nothing is ever
/// dropped or renamed.
pub struct Migrator<'a> {
    orm: &'a Orm,
    models: Vec<ModelDescriptor>,
    done: OnceCell<()>,
}

impl<'a> Migrator<'a> {
    pub fn new<I>(orm: &'a Orm, models: I) -> Self
    where
        I: IntoIterator<Item = ModelDescriptor>,
    {
        Self {
            orm,
            models: models.into_iter().collect(),
            done: OnceCell::new(),
        }
    }

    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    /// Run the migration. A second call after success is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if the ORM is not initialized.
    pub async fn initialize(&self) -> Result<(), OrmError> {
        if self.is_initialized() {
            return Ok(());
        }
        self.done.get_or_try_init(|| self.auto_migrate()).await?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.done.initialized()
    }

    async fn auto_migrate(&self) -> Result<(), OrmError> {
        let db = self.orm.get_db();
        info!(models = self.models.len(), "migrate=start");

        for descriptor in &self.models {
            let schema = db.parse(descriptor);
            if let Err(e) = migrate_model(db, &schema).await {
                migration_counters::migration_failed();
                error!(table = %schema.table, error = %e, "migrate=failed");
                return Err(e);
            }
        }

        migration_counters::migrator_ran();
        migration_counters::log_snapshot("auto_migrate");
        info!("migrate=done");
        Ok(())
    }
}

async fn migrate_model(db: &Database, schema: &Schema) -> Result<(), OrmError> {
    ensure_columns(schema)?;
    let wrap = |source: DbErr| OrmError::Migration {
        table: schema.table.clone(),
        source,
    };

    if db.options().skip_default_transaction {
        let manager = SchemaManager::new(db.connection());
        return apply_schema(&manager, schema, db.options()).await.map_err(wrap);
    }

    let txn = db.connection().begin().await.map_err(wrap)?;
    let manager = SchemaManager::new(&txn);
    apply_schema(&manager, schema, db.options())
        .await
        .map_err(wrap)?;
    txn.commit().await.map_err(wrap)
}

async fn apply_schema(
    manager: &SchemaManager<'_>,
    schema: &Schema,
    options: &OrmOptions,
) -> Result<(), DbErr> {
    migration_counters::schema_check();

    if !manager.has_table(&schema.table).await? {
        let with_foreign_keys = !options.disable_foreign_key_constraint_when_migrating;
        manager
            .create_table(create_table_statement(schema, with_foreign_keys))
            .await?;
        migration_counters::table_created();
        info!(table = %schema.table, "migrate=create_table");
        return Ok(());
    }

    for field in &schema.fields {
        if manager.has_column(&schema.table, &field.db_name).await? {
            continue;
        }
        manager
            .alter_table(add_column_statement(schema, field))
            .await?;
        migration_counters::column_added();
        info!(table = %schema.table, column = %field.db_name, "migrate=add_column");
    }
    Ok(())
}

pub fn create_table_statement(schema: &Schema, with_foreign_keys: bool) -> TableCreateStatement {
    let mut stmt = Table::create();
    stmt.table(Alias::new(schema.table.as_str())).if_not_exists();

    for field in &schema.fields {
        stmt.col(&mut column_def(field, false));
    }

    if with_foreign_keys {
        for field in &schema.fields {
            let Some(target) = &field.references else {
                continue;
            };
            stmt.foreign_key(
                ForeignKey::create()
                    .name(format!("fk_{}_{}", schema.table, field.db_name))
                    .from(
                        Alias::new(schema.table.as_str()),
                        Alias::new(field.db_name.as_str()),
                    )
                    .to(
                        Alias::new(target.table.as_str()),
                        Alias::new(target.column.as_str()),
                    ),
            );
        }
    }
    stmt
}

/// A column added to an existing table must accept the rows already there,
/// so it is nullable unless it carries a default.
pub fn add_column_statement(schema: &Schema, field: &Field) -> TableAlterStatement {
    let mut stmt = Table::alter();
    stmt.table(Alias::new(schema.table.as_str()))
        .add_column(&mut column_def(field, true));
    stmt
}

fn column_def(field: &Field, adding: bool) -> ColumnDef {
    let mut def = ColumnDef::new(Alias::new(field.db_name.as_str()));
    match field.kind {
        ColumnKind::Boolean => def.boolean(),
        ColumnKind::SmallInteger => def.small_integer(),
        ColumnKind::Integer => def.integer(),
        ColumnKind::BigInteger => def.big_integer(),
        ColumnKind::Float => def.float(),
        ColumnKind::Double => def.double(),
        ColumnKind::Text => def.text(),
        ColumnKind::String(Some(len)) => def.string_len(len),
        ColumnKind::String(None) => def.string(),
        ColumnKind::Timestamp => def.timestamp(),
        ColumnKind::TimestampTz => def.timestamp_with_time_zone(),
        ColumnKind::Date => def.date(),
        ColumnKind::Binary => def.binary(),
        ColumnKind::Json => def.json(),
        ColumnKind::Uuid => def.uuid(),
    };

    if adding {
        if field.nullable || field.default.is_none() {
            def.null();
        } else {
            def.not_null();
        }
        // Constraints that existing rows could violate are left out.
    } else {
        if field.primary_key {
            def.primary_key();
        }
        if field.auto_increment {
            def.auto_increment();
        }
        if field.unique && !field.primary_key {
            def.unique_key();
        }
        if field.nullable && !field.primary_key {
            def.null();
        } else {
            def.not_null();
        }
    }

    if let Some(value) = &field.default {
        def.default(value.clone());
    }
    def
}
