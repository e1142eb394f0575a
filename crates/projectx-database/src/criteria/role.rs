use projectx_entity::action::role_action::ROLE_ACTION;
use projectx_entity::role::administrator_role::ADMINISTRATOR_ROLE;
use projectx_entity::role::{Role, RoleType};

use super::action::ActionCriteria;
use super::administrator::AdministratorCriteria;
use super::base::{Criteria, CriteriaBuilder, Filter, text_eq, value_eq};
use super::nested::exists_via_link;
use crate::query::{Conjunction, Scope, TableRef};

pub type RoleCriteria = Criteria<RoleFilter>;

#[derive(Debug, Clone, Default)]
pub struct RoleFilter {
    pub app_name: Option<String>,
    pub name: Option<String>,
    pub role_type: Option<RoleType>,
    /// Roles granting at least one matching action.
    pub action: Option<Box<ActionCriteria>>,
    /// Roles held by at least one matching administrator.
    pub administrator: Option<Box<AdministratorCriteria>>,
}

impl Filter for RoleFilter {
    type Entity = Role;

    fn apply(&self, root: &TableRef, scope: &mut Scope, conjunction: &mut Conjunction) {
        text_eq(conjunction, root, "app_name", &self.app_name);
        text_eq(conjunction, root, "name", &self.name);
        value_eq(conjunction, root, "type", &self.role_type);
        if let Some(action) = &self.action {
            if let Some(exists) =
                exists_via_link(root, &ROLE_ACTION, "role_id", "action_id", action, scope)
            {
                conjunction.and(exists);
            }
        }
        if let Some(administrator) = &self.administrator {
            if let Some(exists) = exists_via_link(
                root,
                &ADMINISTRATOR_ROLE,
                "role_id",
                "admin_id",
                administrator,
                scope,
            ) {
                conjunction.and(exists);
            }
        }
    }
}

impl CriteriaBuilder<RoleFilter> {
    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.filter.app_name = Some(app_name.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.filter.name = Some(name.into());
        self
    }

    pub fn role_type(mut self, role_type: RoleType) -> Self {
        self.filter.role_type = Some(role_type);
        self
    }

    pub fn action(mut self, action: ActionCriteria) -> Self {
        self.filter.action = Some(Box::new(action));
        self
    }

    pub fn administrator(mut self, administrator: AdministratorCriteria) -> Self {
        self.filter.administrator = Some(Box::new(administrator));
        self
    }
}
