//! Role to action grant.

use serde::{Deserialize, Serialize};

use projectx_core::{AppError, AppResult};

use super::model::{ACTION, Action};
use crate::base::{
    AuditFields, Cardinality, ColumnDef, Entity, EntityMeta, FieldDef, LoadedNode, Record,
    RelationDef, UniqueKey, ValueKind, hydrate_one,
};
use crate::role::model::{ROLE, Role};

/// Table metadata for [`RoleAction`].
pub static ROLE_ACTION: EntityMeta = EntityMeta {
    name: "RoleAction",
    table: "mjr_role_x_action",
    columns: &[
        ColumnDef::new("role_id", ValueKind::Int),
        ColumnDef::new("action_id", ValueKind::Int),
    ],
    fields: &[
        FieldDef::new("roleId", "role_id"),
        FieldDef::new("actionId", "action_id"),
    ],
    relations: &[
        RelationDef {
            name: "role",
            cardinality: Cardinality::ToOne,
            target: &ROLE,
            local_column: "role_id",
            remote_column: "id",
        },
        RelationDef {
            name: "action",
            cardinality: Cardinality::ToOne,
            target: &ACTION,
            local_column: "action_id",
            remote_column: "id",
        },
    ],
    keyword_columns: &[],
    unique_keys: &[UniqueKey {
        name: "uq_mjr_role_action",
        columns: &["role_id", "action_id"],
    }],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAction {
    #[serde(flatten)]
    pub audit: AuditFields,
    pub role_id: i64,
    pub action_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Box<Role>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Box<Action>>,
}

impl RoleAction {
    pub fn new(role_id: i64, action_id: i64) -> Self {
        Self {
            audit: AuditFields::new(),
            role_id,
            action_id,
            role: None,
            action: None,
        }
    }
}

impl Entity for RoleAction {
    fn meta() -> &'static EntityMeta {
        &ROLE_ACTION
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
            role_id: record.int("role_id")?,
            action_id: record.int("action_id")?,
            role: None,
            action: None,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("role_id", self.role_id)
            .with("action_id", self.action_id)
    }

    fn attach(&mut self, relation: &str, children: Vec<&LoadedNode>) -> AppResult<()> {
        match relation {
            "role" => self.role = hydrate_one(children)?,
            "action" => self.action = hydrate_one(children)?,
            _ => {
                return Err(AppError::invalid_field(
                    ROLE_ACTION.name,
                    relation,
                    format!("RoleAction has no relation '{relation}'"),
                ));
            }
        }
        Ok(())
    }
}
