//! Column-keyed rows.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDateTime;

use projectx_core::{AppError, AppResult, ErrorKind};

use super::value::Value;

/// A row keyed by column name.
///
/// Missing columns read as `NULL`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: BTreeMap<&'static str, Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// Set a column value.
    pub fn set(&mut self, column: &'static str, value: impl Into<Value>) {
        self.values.insert(column, value.into());
    }

    /// Read a column value.
    pub fn get(&self, column: &str) -> &Value {
        self.values.get(column).unwrap_or(&Value::Null)
    }

    /// Iterate `(column, value)` pairs in column-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    /// The `id` column, if set.
    pub fn id(&self) -> Option<i64> {
        self.get("id").as_int()
    }

    /// Read a required integer column.
    pub fn int(&self, column: &str) -> AppResult<i64> {
        self.opt_int(column)?.ok_or_else(|| missing(column))
    }

    /// Read a nullable integer column.
    pub fn opt_int(&self, column: &str) -> AppResult<Option<i64>> {
        match self.get(column) {
            Value::Null => Ok(None),
            Value::Int(v) => Ok(Some(*v)),
            other => Err(mismatch(column, "integer", other)),
        }
    }

    /// Read a required text column.
    pub fn text(&self, column: &str) -> AppResult<String> {
        self.opt_text(column)?.ok_or_else(|| missing(column))
    }

    /// Read a nullable text column.
    pub fn opt_text(&self, column: &str) -> AppResult<Option<String>> {
        match self.get(column) {
            Value::Null => Ok(None),
            Value::Text(v) => Ok(Some(v.clone())),
            other => Err(mismatch(column, "text", other)),
        }
    }

    /// Read a required timestamp column.
    pub fn timestamp(&self, column: &str) -> AppResult<NaiveDateTime> {
        match self.get(column) {
            Value::Timestamp(v) => Ok(*v),
            Value::Null => Err(missing(column)),
            other => Err(mismatch(column, "timestamp", other)),
        }
    }

    /// Read a text column and parse it (enum columns stored by name).
    pub fn parse<T>(&self, column: &str) -> AppResult<T>
    where
        T: FromStr<Err = AppError>,
    {
        self.text(column)?.parse().map_err(|e: AppError| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Column '{column}' holds an unknown value"),
                e,
            )
        })
    }
}

fn missing(column: &str) -> AppError {
    AppError::new(
        ErrorKind::Serialization,
        format!("Column '{column}' is NULL but the field is required"),
    )
}

fn mismatch(column: &str, expected: &str, found: &Value) -> AppError {
    AppError::new(
        ErrorKind::Serialization,
        format!("Column '{column}' expected {expected}, found {found}"),
    )
}
