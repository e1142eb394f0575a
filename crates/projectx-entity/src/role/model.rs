//! Role entity model.

use serde::{Deserialize, Serialize};

use projectx_core::{AppError, AppResult};

use super::administrator_role::{ADMINISTRATOR_ROLE, AdministratorRole};
use super::role_type::RoleType;
use crate::action::role_action::{ROLE_ACTION, RoleAction};
use crate::base::{
    AuditFields, Cardinality, ColumnDef, Entity, EntityMeta, FieldDef, LoadedNode, Record,
    RelationDef, UniqueKey, ValueKind, hydrate_all,
};

/// Table metadata for [`Role`].
pub static ROLE: EntityMeta = EntityMeta {
    name: "Role",
    table: "mjr_role",
    columns: &[
        ColumnDef::new("app_name", ValueKind::Text),
        ColumnDef::new("name", ValueKind::Text),
        ColumnDef::new("type", ValueKind::Text),
        ColumnDef::new("description", ValueKind::Text),
    ],
    fields: &[
        FieldDef::new("appName", "app_name"),
        FieldDef::new("name", "name"),
        FieldDef::new("roleType", "type"),
        FieldDef::new("description", "description"),
    ],
    relations: &[
        RelationDef {
            name: "roleActions",
            cardinality: Cardinality::ToMany,
            target: &ROLE_ACTION,
            local_column: "id",
            remote_column: "role_id",
        },
        RelationDef {
            name: "administratorRoles",
            cardinality: Cardinality::ToMany,
            target: &ADMINISTRATOR_ROLE,
            local_column: "id",
            remote_column: "role_id",
        },
    ],
    keyword_columns: &["app_name", "name", "description"],
    unique_keys: &[UniqueKey {
        name: "uq_mjr_role_app_name",
        columns: &["app_name", "name"],
    }],
};

/// A named bundle of actions within one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(flatten)]
    pub audit: AuditFields,
    pub app_name: String,
    pub name: String,
    pub role_type: RoleType,
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_actions: Option<Vec<RoleAction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administrator_roles: Option<Vec<AdministratorRole>>,
}

impl Role {
    /// A new, unsaved custom role.
    pub fn new(app_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            audit: AuditFields::new(),
            app_name: app_name.into(),
            name: name.into(),
            role_type: RoleType::Custom,
            description: None,
            role_actions: None,
            administrator_roles: None,
        }
    }

    /// Whether the role can be edited by administrators.
    pub fn is_editable(&self) -> bool {
        self.role_type == RoleType::Custom
    }
}

impl Entity for Role {
    fn meta() -> &'static EntityMeta {
        &ROLE
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
            app_name: record.text("app_name")?,
            name: record.text("name")?,
            role_type: record.parse("type")?,
            description: record.opt_text("description")?,
            role_actions: None,
            administrator_roles: None,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("app_name", self.app_name.as_str())
            .with("name", self.name.as_str())
            .with("type", self.role_type)
            .with("description", self.description.clone())
    }

    fn attach(&mut self, relation: &str, children: Vec<&LoadedNode>) -> AppResult<()> {
        match relation {
            "roleActions" => self.role_actions = Some(hydrate_all(children)?),
            "administratorRoles" => self.administrator_roles = Some(hydrate_all(children)?),
            _ => {
                return Err(AppError::invalid_field(
                    ROLE.name,
                    relation,
                    format!("Role has no relation '{relation}'"),
                ));
            }
        }
        Ok(())
    }
}
