//! Administrator sign-in history.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use projectx_core::{AppError, AppResult};

use super::model::{ADMINISTRATOR, Administrator};
use crate::base::{
    AuditFields, Cardinality, ColumnDef, Entity, EntityMeta, FieldDef, LoadedNode, Record,
    RelationDef, ValueKind, hydrate_one,
};

/// Table metadata for [`AdministratorLoginHistory`].
pub static LOGIN_HISTORY: EntityMeta = EntityMeta {
    name: "AdministratorLoginHistory",
    table: "mjr_admin_login_history",
    columns: &[
        ColumnDef::new("admin_id", ValueKind::Int),
        ColumnDef::new("ip_address", ValueKind::Text),
        ColumnDef::new("os", ValueKind::Text),
        ColumnDef::new("client_agent", ValueKind::Text),
        ColumnDef::new("login_date", ValueKind::Timestamp),
    ],
    fields: &[
        FieldDef::new("administratorId", "admin_id"),
        FieldDef::new("ipAddress", "ip_address"),
        FieldDef::new("os", "os"),
        FieldDef::new("clientAgent", "client_agent"),
        FieldDef::new("loginDate", "login_date"),
    ],
    relations: &[RelationDef {
        name: "administrator",
        cardinality: Cardinality::ToOne,
        target: &ADMINISTRATOR,
        local_column: "admin_id",
        remote_column: "id",
    }],
    keyword_columns: &["ip_address", "os", "client_agent"],
    unique_keys: &[],
};

/// One successful sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdministratorLoginHistory {
    #[serde(flatten)]
    pub audit: AuditFields,
    pub administrator_id: i64,
    pub ip_address: Option<String>,
    pub os: Option<String>,
    pub client_agent: Option<String>,
    pub login_date: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administrator: Option<Box<Administrator>>,
}

impl AdministratorLoginHistory {
    pub fn new(administrator_id: i64, login_date: NaiveDateTime) -> Self {
        Self {
            audit: AuditFields::new(),
            administrator_id,
            ip_address: None,
            os: None,
            client_agent: None,
            login_date,
            administrator: None,
        }
    }
}

impl Entity for AdministratorLoginHistory {
    fn meta() -> &'static EntityMeta {
        &LOGIN_HISTORY
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
            ip_address: record.opt_text("ip_address")?,
            os: record.opt_text("os")?,
            client_agent: record.opt_text("client_agent")?,
            login_date: record.timestamp("login_date")?,
            administrator: None,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("admin_id", self.administrator_id)
            .with("ip_address", self.ip_address.clone())
            .with("os", self.os.clone())
            .with("client_agent", self.client_agent.clone())
            .with("login_date", self.login_date)
    }

    fn attach(&mut self, relation: &str, children: Vec<&LoadedNode>) -> AppResult<()> {
        match relation {
            "administrator" => {
                self.administrator = hydrate_one(children)?;
                Ok(())
            }
            _ => Err(AppError::invalid_field(
                LOGIN_HISTORY.name,
                relation,
                format!("AdministratorLoginHistory has no relation '{relation}'"),
            )),
        }
    }
}
