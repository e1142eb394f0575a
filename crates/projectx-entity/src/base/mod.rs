//! Building blocks shared by every entity.

pub mod audit;
pub mod entity;
pub mod graph;
pub mod meta;
pub mod record;
pub mod value;

pub use audit::AuditFields;
pub use entity::{Entity, hydrate, hydrate_all, hydrate_one};
pub use graph::LoadedNode;
pub use meta::{Cardinality, ColumnDef, EntityMeta, FieldDef, RelationDef, UniqueKey};
pub use record::Record;
pub use value::{Value, ValueKind};
