use std::sync::Arc;

use dashmap::DashMap;
use sea_orm::sea_query::{Alias, Condition, ConditionalStatement, Query, SimpleExpr};
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, ExecResult, FromQueryResult,
    Statement, TransactionTrait,
};
use tracing::debug;

use crate::error::OrmError;
use crate::naming::NamingStrategy;
use crate::options::OrmOptions;
use crate::schema::{Model, ModelDescriptor, Record, Schema};

/// Live handle of an initialized [`crate::Orm`].
#[derive(Debug)]
pub struct Database {
    conn: DatabaseConnection,
    dsn: String,
    naming: Arc<dyn NamingStrategy>,
    options: OrmOptions,
    schemas: DashMap<String, (ModelDescriptor, Arc<Schema>)>,
}

impl Database {
    pub(crate) fn new(
        conn: DatabaseConnection,
        dsn: String,
        naming: Arc<dyn NamingStrategy>,
        options: OrmOptions,
    ) -> Self {
        Self {
            conn,
            dsn,
            naming,
            options,
            schemas: DashMap::new(),
        }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub fn backend(&self) -> DatabaseBackend {
        self.conn.get_database_backend()
    }

    /// Connection string with the password masked.
    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    pub fn naming_strategy(&self) -> &dyn NamingStrategy {
        self.naming.as_ref()
    }

    pub fn options(&self) -> &OrmOptions {
        &self.options
    }

    /// Parse a descriptor with the live naming strategy. Schemas are cached
    /// per type name; a cached entry is reused only for an identical
    /// descriptor and replaced otherwise.
    pub fn parse(&self, descriptor: &ModelDescriptor) -> Arc<Schema> {
        if let Some(entry) = self.schemas.get(&descriptor.type_name) {
            let (cached, schema) = entry.value();
            if cached == descriptor {
                return Arc::clone(schema);
            }
        }
        let schema = Arc::new(Schema::parse(descriptor, self.naming.as_ref()));
        self.schemas.insert(
            descriptor.type_name.clone(),
            (descriptor.clone(), Arc::clone(&schema)),
        );
        schema
    }

    pub fn schema_of<M: Model>(&self) -> Arc<Schema> {
        self.parse(&M::descriptor())
    }

    pub async fn find_all<M>(&self) -> Result<Vec<M>, OrmError>
    where
        M: Model + FromQueryResult,
    {
        self.find(Condition::all(), None).await
    }

    /// Rows matching `condition`; `limit == None` means no limit.
    pub async fn find<M>(&self, condition: Condition, limit: Option<u64>) -> Result<Vec<M>, OrmError>
    where
        M: Model + FromQueryResult,
    {
        let schema = self.schema_of::<M>();
        ensure_columns(&schema)?;

        let mut query = Query::select();
        query
            .columns(schema.fields.iter().map(|f| Alias::new(f.db_name.as_str())))
            .from(Alias::new(schema.table.as_str()))
            .cond_where(condition);
        if let Some(limit) = limit {
            query.limit(limit);
        }

        let stmt = self.backend().build(&query);
        debug!(table = %schema.table, "orm=find");
        Ok(M::find_by_statement(stmt).all(&self.conn).await?)
    }

    /// First row matching `condition`, or [`OrmError::RecordNotFound`].
    pub async fn first<M>(&self, condition: Condition) -> Result<M, OrmError>
    where
        M: Model + FromQueryResult,
    {
        self.find(condition, Some(1))
            .await?
            .into_iter()
            .next()
            .ok_or(OrmError::RecordNotFound)
    }

    /// Insert one row. Auto-increment columns are left to the database.
    pub async fn create<M: Record>(&self, record: &M) -> Result<u64, OrmError> {
        let schema = self.schema_of::<M>();
        ensure_columns(&schema)?;

        let values = record.values();
        if values.len() != schema.fields.len() {
            return Err(OrmError::Model {
                model: schema.name.clone(),
                message: format!(
                    "expected {} values, got {}",
                    schema.fields.len(),
                    values.len()
                ),
            });
        }

        let (columns, exprs): (Vec<Alias>, Vec<SimpleExpr>) = schema
            .fields
            .iter()
            .zip(values)
            .filter(|(f, _)| !f.auto_increment)
            .map(|(f, v)| (Alias::new(f.db_name.as_str()), SimpleExpr::from(v)))
            .unzip();

        let mut insert = Query::insert();
        insert
            .into_table(Alias::new(schema.table.as_str()))
            .columns(columns);
        insert.values(exprs).map_err(|e| OrmError::Model {
            model: schema.name.clone(),
            message: e.to_string(),
        })?;

        let stmt = self.backend().build(&insert);
        debug!(table = %schema.table, "orm=create");
        Ok(self.exec(stmt).await?.rows_affected())
    }

    /// Delete rows matching `condition`. An empty condition is refused unless
    /// global updates are allowed.
    pub async fn delete<M: Model>(&self, condition: Condition) -> Result<u64, OrmError> {
        let schema = self.schema_of::<M>();
        if condition.is_empty() && !self.options.allow_global_update {
            return Err(OrmError::MissingWhereClause {
                operation: "delete",
                table: schema.table.clone(),
            });
        }

        let mut delete = Query::delete();
        delete
            .from_table(Alias::new(schema.table.as_str()))
            .cond_where(condition);

        let stmt = self.backend().build(&delete);
        debug!(table = %schema.table, "orm=delete");
        Ok(self.exec(stmt).await?.rows_affected())
    }

    async fn exec(&self, stmt: Statement) -> Result<ExecResult, DbErr> {
        if self.options.skip_default_transaction {
            return self.conn.execute(stmt).await;
        }
        let txn = self.conn.begin().await?;
        let result = txn.execute(stmt).await?;
        txn.commit().await?;
        Ok(result)
    }

    pub(crate) async fn close(self) -> Result<(), DbErr> {
        self.conn.close().await
    }
}

pub(crate) fn ensure_columns(schema: &Schema) -> Result<(), OrmError> {
    if schema.fields.is_empty() {
        return Err(OrmError::Model {
            model: schema.name.clone(),
            message: "model has no public fields".to_string(),
        });
    }
    Ok(())
}
