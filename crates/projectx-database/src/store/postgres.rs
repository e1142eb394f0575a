//! PostgreSQL adapter.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Row};
use tracing::debug;

use projectx_core::error::{AppError, ErrorKind};
use projectx_core::AppResult;
use projectx_entity::{Value, ValueKind};

use super::{RefetchOrdering, Store, StoreCapabilities};
use crate::query::{Insert, Mutation, Projection, Select, sql};

/// Statements run on a borrowed connection; pass `&mut *tx` to run inside a
/// caller-owned transaction.
#[async_trait]
impl Store for PgConnection {
    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities {
            backend: "postgres",
            refetch_ordering: RefetchOrdering::ReapplySort,
        }
    }

    async fn fetch(&mut self, select: &Select) -> AppResult<Vec<Vec<Value>>> {
        let mut query = sql::select(select);
        debug!(sql = query.sql(), "fetch");
        let rows = query
            .build()
            .fetch_all(&mut *self)
            .await
            .map_err(|e| map_sqlx_error(e, select.from.table))?;

        match &select.projection {
            Projection::Columns(columns) => rows
                .iter()
                .map(|row| {
                    columns
                        .iter()
                        .enumerate()
                        .map(|(i, c)| decode(row, i, c.kind))
                        .collect::<AppResult<Vec<_>>>()
                })
                .collect(),
            Projection::Count | Projection::CountDistinct(_) => rows
                .iter()
                .map(|row| decode(row, 0, ValueKind::Int).map(|v| vec![v]))
                .collect(),
        }
    }

    async fn execute(&mut self, mutation: &Mutation) -> AppResult<u64> {
        let mut query = match mutation {
            Mutation::Update(update) => sql::update(update),
            Mutation::Delete(delete) => sql::delete(delete),
        };
        debug!(sql = query.sql(), "execute");
        let result = query
            .build()
            .execute(&mut *self)
            .await
            .map_err(|e| map_sqlx_error(e, mutation.table()))?;
        Ok(result.rows_affected())
    }

    async fn insert(&mut self, insert: &Insert) -> AppResult<i64> {
        let mut query = sql::insert(insert);
        debug!(sql = query.sql(), "insert");
        let row = query
            .build()
            .fetch_one(&mut *self)
            .await
            .map_err(|e| map_sqlx_error(e, insert.table))?;
        row.try_get::<i64, _>(0)
            .map_err(|e| AppError::with_source(ErrorKind::Serialization, "Insert returned no id", e))
    }
}

fn decode(row: &PgRow, index: usize, kind: ValueKind) -> AppResult<Value> {
    let decoded = match kind {
        ValueKind::Int => row.try_get::<Option<i64>, _>(index).map(Value::from),
        ValueKind::Text => row.try_get::<Option<String>, _>(index).map(Value::from),
        ValueKind::Timestamp => row.try_get::<Option<NaiveDateTime>, _>(index).map(Value::from),
    };
    decoded.map_err(|e| {
        AppError::with_source(
            ErrorKind::Serialization,
            format!("Failed to decode column {index}"),
            e,
        )
    })
}

/// Integrity violations (SQLSTATE class 23) become `Conflict`; everything
/// else is a `Database` error.
pub(crate) fn map_sqlx_error(error: sqlx::Error, table: &str) -> AppError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.code().is_some_and(|code| code.starts_with("23")) {
            let constraint = db_error.constraint().unwrap_or("unknown").to_string();
            return AppError::with_source(
                ErrorKind::Conflict,
                format!("Constraint '{constraint}' violated on {table}"),
                error,
            );
        }
    }
    AppError::with_source(
        ErrorKind::Database,
        format!("Statement on {table} failed: {error}"),
        error,
    )
}
