use std::error::Error as StdError;

use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrmError {
    #[error("failed to open database: {source}")]
    Open {
        #[source]
        source: DbErr,
    },
    #[error("failed to close database connection: {source}")]
    Close {
        #[source]
        source: DbErr,
    },
    #[error("ORM is not initialized")]
    NotInitialized,
    #[error("Configuration error: {message}")]
    Config { message: String },
    #[error("query failed: {0}")]
    Query(#[from] DbErr),
    #[error("failed to migrate table '{table}': {source}")]
    Migration {
        table: String,
        #[source]
        source: DbErr,
    },
    #[error("invalid model '{model}': {message}")]
    Model { model: String, message: String },
    #[error("refusing to {operation} every row of '{table}' without a condition")]
    MissingWhereClause {
        operation: &'static str,
        table: String,
    },
    #[error("record not found")]
    RecordNotFound,
}

impl OrmError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn is_record_not_found(&self) -> bool {
        is_record_not_found_error(self)
    }
}

/// Whether `err`, or anything in its source chain, is the "record not found"
/// sentinel, whether it came from this crate or straight from the driver.
pub fn is_record_not_found_error(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(OrmError::RecordNotFound) = e.downcast_ref::<OrmError>() {
            return true;
        }
        if let Some(DbErr::RecordNotFound(_)) = e.downcast_ref::<DbErr>() {
            return true;
        }
        current = e.source();
    }
    false
}

pub fn new_record_not_found_error() -> OrmError {
    OrmError::RecordNotFound
}
