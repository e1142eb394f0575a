use projectx_entity::administrator::{Administrator, AdministratorStatus};
use projectx_entity::role::administrator_role::ADMINISTRATOR_ROLE;

use super::base::{Criteria, CriteriaBuilder, Filter, text_eq, value_eq};
use super::nested::exists_via_link;
use super::role::RoleCriteria;
use crate::query::{Conjunction, Scope, TableRef};

pub type AdministratorCriteria = Criteria<AdministratorFilter>;

#[derive(Debug, Clone, Default)]
pub struct AdministratorFilter {
    pub name: Option<String>,
    pub login_id: Option<String>,
    pub status: Option<AdministratorStatus>,
    /// Administrators holding at least one matching role.
    pub role: Option<Box<RoleCriteria>>,
}

impl Filter for AdministratorFilter {
    type Entity = Administrator;

    fn apply(&self, root: &TableRef, scope: &mut Scope, conjunction: &mut Conjunction) {
        text_eq(conjunction, root, "name", &self.name);
        text_eq(conjunction, root, "login_id", &self.login_id);
        value_eq(conjunction, root, "status", &self.status);
        if let Some(role) = &self.role {
            if let Some(exists) =
                exists_via_link(root, &ADMINISTRATOR_ROLE, "admin_id", "role_id", role, scope)
            {
                conjunction.and(exists);
            }
        }
    }
}

impl CriteriaBuilder<AdministratorFilter> {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.filter.name = Some(name.into());
        self
    }

    pub fn login_id(mut self, login_id: impl Into<String>) -> Self {
        self.filter.login_id = Some(login_id.into());
        self
    }

    pub fn status(mut self, status: AdministratorStatus) -> Self {
        self.filter.status = Some(status);
        self
    }

    pub fn role(mut self, role: RoleCriteria) -> Self {
        self.filter.role = Some(Box::new(role));
        self
    }
}
