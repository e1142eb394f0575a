//! # projectx-entity
//!
//! Entity models for the ProjectX admin backend. Every entity carries the
//! audit base record and publishes a static [`EntityMeta`] describing its
//! table, columns, orderable fields and relations. The query engine reads
//! this registry instead of reflecting over types.

pub mod action;
pub mod administrator;
pub mod base;
pub mod role;

pub use base::{
    AuditFields, Cardinality, ColumnDef, Entity, EntityMeta, FieldDef, LoadedNode, Record,
    RelationDef, UniqueKey, Value, ValueKind,
};

/// Every entity known to the registry, in dependency order.
pub static SCHEMA: &[&EntityMeta] = &[
    &administrator::model::ADMINISTRATOR,
    &role::model::ROLE,
    &action::model::ACTION,
    &role::administrator_role::ADMINISTRATOR_ROLE,
    &action::role_action::ROLE_ACTION,
    &administrator::login_history::LOGIN_HISTORY,
];
