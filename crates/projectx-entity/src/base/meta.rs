//! Static entity metadata.
//!
//! Each entity publishes one `static` [`EntityMeta`]. Relations point at the
//! target's static, so the registry forms a graph that sort resolution,
//! fetch graph validation and the store adapters walk at runtime.

use std::fmt;

use super::value::ValueKind;

/// Audit columns present on every table, in projection order.
pub const AUDIT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", ValueKind::Int),
    ColumnDef::new("created_by", ValueKind::Int),
    ColumnDef::new("created_date", ValueKind::Timestamp),
    ColumnDef::new("updated_by", ValueKind::Int),
    ColumnDef::new("updated_date", ValueKind::Timestamp),
];

/// Audit properties present on every entity.
pub const AUDIT_FIELDS: &[FieldDef] = &[
    FieldDef::new("id", "id"),
    FieldDef::new("createdBy", "created_by"),
    FieldDef::new("createdDate", "created_date"),
    FieldDef::new("updatedBy", "updated_by"),
    FieldDef::new("updatedDate", "updated_date"),
];

/// A physical column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ValueKind,
}

impl ColumnDef {
    pub const fn new(name: &'static str, kind: ValueKind) -> Self {
        Self { name, kind }
    }
}

/// A scalar property exposed to criteria and sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// camelCase property name used in sort keys and update specs.
    pub property: &'static str,
    /// Backing column.
    pub column: &'static str,
    /// Whether the property may appear in a sort key.
    pub orderable: bool,
}

impl FieldDef {
    pub const fn new(property: &'static str, column: &'static str) -> Self {
        Self {
            property,
            column,
            orderable: true,
        }
    }

    /// A property that is stored but never sorted on.
    pub const fn unordered(property: &'static str, column: &'static str) -> Self {
        Self {
            property,
            column,
            orderable: false,
        }
    }
}

/// Cardinality of a relation as seen from its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    ToOne,
    ToMany,
}

/// A navigable relation.
///
/// Joining reads `target.remote_column = owner.local_column`.
pub struct RelationDef {
    pub name: &'static str,
    pub cardinality: Cardinality,
    pub target: &'static EntityMeta,
    pub local_column: &'static str,
    pub remote_column: &'static str,
}

impl fmt::Debug for RelationDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The target is printed by name; relations form cycles.
        f.debug_struct("RelationDef")
            .field("name", &self.name)
            .field("cardinality", &self.cardinality)
            .field("target", &self.target.name)
            .field("local_column", &self.local_column)
            .field("remote_column", &self.remote_column)
            .finish()
    }
}

impl RelationDef {
    pub fn is_collection(&self) -> bool {
        self.cardinality == Cardinality::ToMany
    }
}

/// A named uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniqueKey {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

/// Table-level description of an entity.
#[derive(Debug)]
pub struct EntityMeta {
    /// Entity type name used in error messages.
    pub name: &'static str,
    pub table: &'static str,
    /// Entity columns, excluding the audit columns.
    pub columns: &'static [ColumnDef],
    /// Entity properties, excluding the audit properties.
    pub fields: &'static [FieldDef],
    pub relations: &'static [RelationDef],
    /// Columns searched by the free-text keyword.
    pub keyword_columns: &'static [&'static str],
    pub unique_keys: &'static [UniqueKey],
}

impl EntityMeta {
    /// Primary key column.
    pub const ID: &'static str = "id";

    /// Audit columns followed by entity columns.
    pub fn all_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        AUDIT_COLUMNS.iter().chain(self.columns.iter())
    }

    /// Number of columns in a full projection.
    pub fn column_count(&self) -> usize {
        AUDIT_COLUMNS.len() + self.columns.len()
    }

    /// Look up a column definition.
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.all_columns().find(|c| c.name == name)
    }

    /// Look up a property, audit properties included.
    pub fn field(&self, property: &str) -> Option<&FieldDef> {
        AUDIT_FIELDS
            .iter()
            .chain(self.fields.iter())
            .find(|f| f.property == property)
    }

    /// Whether the property is one of the audit properties.
    pub fn is_audit_field(property: &str) -> bool {
        AUDIT_FIELDS.iter().any(|f| f.property == property)
    }

    /// Look up a relation by name.
    pub fn relation(&'static self, name: &str) -> Option<&'static RelationDef> {
        self.relations.iter().find(|r| r.name == name)
    }
}

impl PartialEq for EntityMeta {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table
    }
}

impl Eq for EntityMeta {}

#[cfg(test)]
mod tests {
    use crate::SCHEMA;
    use crate::role::model::ROLE;

    #[test]
    fn test_relation_columns_exist() {
        for meta in SCHEMA {
            for relation in meta.relations {
                assert!(
                    relation.target.column(relation.remote_column).is_some(),
                    "{}.{} targets a missing column",
                    meta.name,
                    relation.name
                );
                assert!(meta.column(relation.local_column).is_some());
            }
        }
    }

    #[test]
    fn test_every_field_has_a_column() {
        for meta in SCHEMA {
            for field in meta.fields {
                assert!(meta.column(field.column).is_some(), "{}.{}", meta.name, field.property);
            }
        }
    }

    #[test]
    fn test_audit_fields_resolve_on_every_entity() {
        let field = ROLE.field("createdDate").unwrap();
        assert_eq!(field.column, "created_date");
        assert!(ROLE.field("nope").is_none());
    }
}
