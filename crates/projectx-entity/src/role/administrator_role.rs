//! Administrator to role assignment.

use serde::{Deserialize, Serialize};

use projectx_core::{AppError, AppResult};

use super::model::{ROLE, Role};
use crate::administrator::model::{ADMINISTRATOR, Administrator};
use crate::base::{
    AuditFields, Cardinality, ColumnDef, Entity, EntityMeta, FieldDef, LoadedNode, Record,
    RelationDef, UniqueKey, ValueKind, hydrate_one,
};

/// Table metadata for [`AdministratorRole`].
pub static ADMINISTRATOR_ROLE: EntityMeta = EntityMeta {
    name: "AdministratorRole",
    table: "mjr_admin_x_role",
    columns: &[
        ColumnDef::new("admin_id", ValueKind::Int),
        ColumnDef::new("role_id", ValueKind::Int),
    ],
    fields: &[
        FieldDef::new("administratorId", "admin_id"),
        FieldDef::new("roleId", "role_id"),
    ],
    relations: &[
        RelationDef {
            name: "administrator",
            cardinality: Cardinality::ToOne,
            target: &ADMINISTRATOR,
            local_column: "admin_id",
            remote_column: "id",
        },
        RelationDef {
            name: "role",
            cardinality: Cardinality::ToOne,
            target: &ROLE,
            local_column: "role_id",
            remote_column: "id",
        },
    ],
    keyword_columns: &[],
    unique_keys: &[UniqueKey {
        name: "uq_mjr_admin_role",
        columns: &["admin_id", "role_id"],
    }],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdministratorRole {
    #[serde(flatten)]
    pub audit: AuditFields,
    pub administrator_id: i64,
    pub role_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administrator: Option<Box<Administrator>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Box<Role>>,
}

impl AdministratorRole {
    pub fn new(administrator_id: i64, role_id: i64) -> Self {
        Self {
            audit: AuditFields::new(),
            administrator_id,
            role_id,
            administrator: None,
            role: None,
        }
    }
}

impl Entity for AdministratorRole {
    fn meta() -> &'static EntityMeta {
        &ADMINISTRATOR_ROLE
    }

    fn audit(&self) -> &AuditFields {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }

    fn from_record(record: &Record) -> AppResult<Self> {
        Ok(Self {
            audit: AuditFields::from_record(record)?,
            administrator_id: record.int("admin_id")?,
            role_id: record.int("role_id")?,
            administrator: None,
            role: None,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("admin_id", self.administrator_id)
            .with("role_id", self.role_id)
    }

    fn attach(&mut self, relation: &str, children: Vec<&LoadedNode>) -> AppResult<()> {
        match relation {
            "administrator" => self.administrator = hydrate_one(children)?,
            "role" => self.role = hydrate_one(children)?,
            _ => {
                return Err(AppError::invalid_field(
                    ADMINISTRATOR_ROLE.name,
                    relation,
                    format!("AdministratorRole has no relation '{relation}'"),
                ));
            }
        }
        Ok(())
    }
}
