use projectx_entity::role::AdministratorRole;

use super::administrator::AdministratorCriteria;
use super::base::{Criteria, CriteriaBuilder, Filter, value_eq};
use super::nested::exists_referenced;
use super::role::RoleCriteria;
use crate::query::{Conjunction, Scope, TableRef};

pub type AdministratorRoleCriteria = Criteria<AdministratorRoleFilter>;

#[derive(Debug, Clone, Default)]
pub struct AdministratorRoleFilter {
    pub administrator_id: Option<i64>,
    pub role_id: Option<i64>,
    pub administrator: Option<Box<AdministratorCriteria>>,
    pub role: Option<Box<RoleCriteria>>,
}

impl Filter for AdministratorRoleFilter {
    type Entity = AdministratorRole;

    fn apply(&self, root: &TableRef, scope: &mut Scope, conjunction: &mut Conjunction) {
        value_eq(conjunction, root, "admin_id", &self.administrator_id);
        value_eq(conjunction, root, "role_id", &self.role_id);
        if let Some(administrator) = &self.administrator {
            if let Some(exists) = exists_referenced(root, "admin_id", administrator, scope) {
                conjunction.and(exists);
            }
        }
        if let Some(role) = &self.role {
            if let Some(exists) = exists_referenced(root, "role_id", role, scope) {
                conjunction.and(exists);
            }
        }
    }
}

impl CriteriaBuilder<AdministratorRoleFilter> {
    pub fn administrator_id(mut self, administrator_id: i64) -> Self {
        self.filter.administrator_id = Some(administrator_id);
        self
    }

    pub fn role_id(mut self, role_id: i64) -> Self {
        self.filter.role_id = Some(role_id);
        self
    }

    pub fn administrator(mut self, administrator: AdministratorCriteria) -> Self {
        self.filter.administrator = Some(Box::new(administrator));
        self
    }

    pub fn role(mut self, role: RoleCriteria) -> Self {
        self.filter.role = Some(Box::new(role));
        self
    }
}
