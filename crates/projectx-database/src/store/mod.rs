//! Store adapters.
//!
//! A store executes the statement representation from [`crate::query`]. The
//! caller owns the connection (or transaction) and passes it to every
//! repository call; the engine never begins or commits transactions.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use projectx_core::{AppError, AppResult};
use projectx_entity::Value;

use crate::query::{Insert, Mutation, Select};

pub use memory::{JournalEntry, MemoryStore};

/// How a store keeps the phase-1 id order when refetching by `IN (...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefetchOrdering {
    /// Re-applying the original sort to the refetched rows reproduces the
    /// phase-1 order.
    ReapplySort,
    /// Order by each id's position in the phase-1 list.
    RankByPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCapabilities {
    pub backend: &'static str,
    pub refetch_ordering: RefetchOrdering,
}

/// Executes statements against one connection.
#[async_trait]
pub trait Store: Send {
    fn capabilities(&self) -> StoreCapabilities;

    /// Run a select. Each row holds one value per projected column.
    async fn fetch(&mut self, select: &Select) -> AppResult<Vec<Vec<Value>>>;

    /// Run an update or delete and return the affected row count.
    async fn execute(&mut self, mutation: &Mutation) -> AppResult<u64>;

    /// Insert one row and return its generated id.
    async fn insert(&mut self, insert: &Insert) -> AppResult<i64>;
}

/// Run a count projection.
pub(crate) async fn fetch_count<S: Store + ?Sized>(store: &mut S, select: &Select) -> AppResult<u64> {
    let rows = store.fetch(select).await?;
    let count = rows
        .first()
        .and_then(|row| row.first())
        .and_then(Value::as_int)
        .ok_or_else(|| AppError::internal("Count query returned no value"))?;
    Ok(u64::try_from(count).unwrap_or_default())
}

/// Run a single-column integer projection.
pub(crate) async fn fetch_ints<S: Store + ?Sized>(store: &mut S, select: &Select) -> AppResult<Vec<i64>> {
    store
        .fetch(select)
        .await?
        .into_iter()
        .map(|row| {
            row.first()
                .and_then(Value::as_int)
                .ok_or_else(|| AppError::internal("Id query returned a NULL id"))
        })
        .collect()
}
