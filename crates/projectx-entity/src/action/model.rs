//! Action entity model.

use serde::{Deserialize, Serialize};

use projectx_core::{AppError, AppResult};

use super::action_type::ActionType;
use super::role_action::{ROLE_ACTION, RoleAction};
use crate::base::{
    AuditFields, Cardinality, ColumnDef, Entity, EntityMeta, FieldDef, LoadedNode, Record,
    RelationDef, UniqueKey, ValueKind, hydrate_all,
};

/// Table metadata for [`Action`].
pub static ACTION: EntityMeta = EntityMeta {
    name: "Action",
    table: "mjr_action",
    columns: &[
        ColumnDef::new("app_name", ValueKind::Text),
        ColumnDef::new("page", ValueKind::Text),
        ColumnDef::new("action_name", ValueKind::Text),
        ColumnDef::new("display_name", ValueKind::Text),
        ColumnDef::new("action_type", ValueKind::Text),
        ColumnDef::new("url", ValueKind::Text),
        ColumnDef::new("description", ValueKind::Text),
    ],
    fields: &[
        FieldDef::new("appName", "app_name"),
        FieldDef::new("page", "page"),
        FieldDef::new("actionName", "action_name"),
        FieldDef::new("displayName", "display_name"),
        FieldDef::new("actionType", "action_type"),
        FieldDef::new("url", "url"),
        FieldDef::new("description", "description"),
    ],
    relations: &[RelationDef {
        name: "roleActions",
        cardinality: Cardinality::ToMany,
        target: &ROLE_ACTION,
        local_column: "id",
        remote_column: "action_id",
    }],
    keyword_columns: &[
        "app_name",
        "page",
        "action_name",
        "display_name",
        "url",
        "description",
    ],
    unique_keys: &[UniqueKey {
        name: "uq_mjr_action_url",
        columns: &["url"],
    }],
};

/// A protected URL, grouped by application and page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(flatten)]
    pub audit: AuditFields,
    pub app_name: String,
    pub page: String,
    pub action_name: String,
    pub display_name: String,
    pub action_type: ActionType,
    pub url: String,
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_actions: Option<Vec<RoleAction>>,
}

impl Action {
    /// A new, unsaved main action whose display name defaults to its name.
    pub fn new(
        app_name: impl Into<String>,
        page: impl Into<String>,
        action_name: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        let action_name = action_name.into();
        Self {
            audit: AuditFields::new(),
            app_name: app_name.into(),
            page: page.into(),
            display_name: action_name.clone(),
            action_name,
            action_type: ActionType::Main,
            url: url.into(),
            description: None,
            role_actions: None,
        }
    }
}

impl Entity for Action {
    fn meta() -> &'static EntityMeta {
        &ACTION
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
            page: record.text("page")?,
            action_name: record.text("action_name")?,
            display_name: record.text("display_name")?,
            action_type: record.parse("action_type")?,
            url: record.text("url")?,
            description: record.opt_text("description")?,
            role_actions: None,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("app_name", self.app_name.as_str())
            .with("page", self.page.as_str())
            .with("action_name", self.action_name.as_str())
            .with("display_name", self.display_name.as_str())
            .with("action_type", self.action_type)
            .with("url", self.url.as_str())
            .with("description", self.description.clone())
    }

    fn attach(&mut self, relation: &str, children: Vec<&LoadedNode>) -> AppResult<()> {
        match relation {
            "roleActions" => {
                self.role_actions = Some(hydrate_all(children)?);
                Ok(())
            }
            _ => Err(AppError::invalid_field(
                ACTION.name,
                relation,
                format!("Action has no relation '{relation}'"),
            )),
        }
    }
}
