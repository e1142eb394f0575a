//! Store-neutral query representation.
//!
//! Criteria and repositories build these values; store adapters either
//! render them to SQL ([`sql`]) or evaluate them directly.

pub mod predicate;
pub mod sql;
pub mod statement;

pub use predicate::{CmpOp, ColumnRef, Conjunction, Join, JoinKind, Predicate, Scope, SubQuery, TableRef};
pub use statement::{Delete, Insert, Mutation, OrderExpr, OrderTerm, Projection, Select, Selected, Update};
