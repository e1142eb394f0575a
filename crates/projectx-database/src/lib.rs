//! # projectx-database
//!
//! Criteria-driven query engine for the ProjectX admin backend: typed
//! criteria compile into a small predicate/statement IR, which store
//! adapters either render to PostgreSQL or evaluate in memory. Repositories
//! layer the paging protocol, fetch graphs and chunked bulk mutations on top.

pub mod connection;
pub mod criteria;
pub mod fetch;
pub mod migration;
pub mod query;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use criteria::{Criteria, CriteriaBuilder, Filter};
pub use fetch::{FetchGraph, Include};
pub use repositories::{CriteriaRepository, RepositoryPolicy, UpdateSpec};
pub use store::{MemoryStore, RefetchOrdering, Store, StoreCapabilities};
