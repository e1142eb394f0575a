//! Administrator entity model.

use serde::{Deserialize, Serialize};

use projectx_core::{AppError, AppResult};

use super::login_history::{AdministratorLoginHistory, LOGIN_HISTORY};
use super::status::AdministratorStatus;
use crate::base::{
    AuditFields, Cardinality, ColumnDef, Entity, EntityMeta, FieldDef, LoadedNode, Record,
    RelationDef, UniqueKey, ValueKind, hydrate_all,
};
use crate::role::administrator_role::{ADMINISTRATOR_ROLE, AdministratorRole};

/// Table metadata for [`Administrator`].
pub static ADMINISTRATOR: EntityMeta = EntityMeta {
    name: "Administrator",
    table: "mjr_admin",
    columns: &[
        ColumnDef::new("name", ValueKind::Text),
        ColumnDef::new("login_id", ValueKind::Text),
        ColumnDef::new("password", ValueKind::Text),
        ColumnDef::new("status", ValueKind::Text),
    ],
    fields: &[
        FieldDef::new("name", "name"),
        FieldDef::new("loginId", "login_id"),
        FieldDef::unordered("password", "password"),
        FieldDef::new("status", "status"),
    ],
    relations: &[
        RelationDef {
            name: "administratorRoles",
            cardinality: Cardinality::ToMany,
            target: &ADMINISTRATOR_ROLE,
            local_column: "id",
            remote_column: "admin_id",
        },
        RelationDef {
            name: "loginHistories",
            cardinality: Cardinality::ToMany,
            target: &LOGIN_HISTORY,
            local_column: "id",
            remote_column: "admin_id",
        },
    ],
    keyword_columns: &["name", "login_id"],
    unique_keys: &[UniqueKey {
        name: "uq_mjr_admin_login",
        columns: &["login_id"],
    }],
};

/// A back-office operator account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Administrator {
    #[serde(flatten)]
    pub audit: AuditFields,
    pub name: String,
    /// Unique sign-in name.
    pub login_id: String,
    /// Password hash.
    #[serde(skip_serializing)]
    pub password: String,
    pub status: AdministratorStatus,
    /// Loaded only when requested by a fetch graph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administrator_roles: Option<Vec<AdministratorRole>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_histories: Option<Vec<AdministratorLoginHistory>>,
}

impl Administrator {
    /// A new, unsaved active administrator.
    pub fn new(name: impl Into<String>, login_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            audit: AuditFields::new(),
            name: name.into(),
            login_id: login_id.into(),
            password: password.into(),
            status: AdministratorStatus::Active,
            administrator_roles: None,
            login_histories: None,
        }
    }
}

impl Entity for Administrator {
    fn meta() -> &'static EntityMeta {
        &ADMINISTRATOR
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
            name: record.text("name")?,
            login_id: record.text("login_id")?,
            password: record.text("password")?,
            status: record.parse("status")?,
            administrator_roles: None,
            login_histories: None,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("name", self.name.as_str())
            .with("login_id", self.login_id.as_str())
            .with("password", self.password.as_str())
            .with("status", self.status)
    }

    fn attach(&mut self, relation: &str, children: Vec<&LoadedNode>) -> AppResult<()> {
        match relation {
            "administratorRoles" => self.administrator_roles = Some(hydrate_all(children)?),
            "loginHistories" => self.login_histories = Some(hydrate_all(children)?),
            _ => {
                return Err(AppError::invalid_field(
                    ADMINISTRATOR.name,
                    relation,
                    format!("Administrator has no relation '{relation}'"),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::hydrate;

    #[test]
    fn test_record_round_trip_keeps_status() {
        let mut admin = Administrator::new("Aung", "aung", "hash");
        admin.status = AdministratorStatus::Suspended;
        let mut record = admin.to_record();
        admin.audit.write(&mut record);
        record.set("id", 7_i64);

        let loaded: Administrator = hydrate(&LoadedNode::new(record)).unwrap();
        assert_eq!(loaded.audit.id, Some(7));
        assert_eq!(loaded.status, AdministratorStatus::Suspended);
        assert!(loaded.administrator_roles.is_none());
    }

    #[test]
    fn test_password_is_not_serialized() {
        let admin = Administrator::new("Aung", "aung", "hash");
        let json = serde_json::to_value(&admin).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["loginId"], "aung");
    }

    #[test]
    fn test_attach_unknown_relation_fails() {
        let mut admin = Administrator::new("Aung", "aung", "hash");
        assert!(admin.attach("roles", Vec::new()).is_err());
    }
}
