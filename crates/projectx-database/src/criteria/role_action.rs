use projectx_entity::action::RoleAction;

use super::action::ActionCriteria;
use super::base::{Criteria, CriteriaBuilder, Filter, value_eq};
use super::nested::exists_referenced;
use super::role::RoleCriteria;
use crate::query::{Conjunction, Scope, TableRef};

pub type RoleActionCriteria = Criteria<RoleActionFilter>;

#[derive(Debug, Clone, Default)]
pub struct RoleActionFilter {
    pub role_id: Option<i64>,
    pub action_id: Option<i64>,
    pub role: Option<Box<RoleCriteria>>,
    pub action: Option<Box<ActionCriteria>>,
}

impl Filter for RoleActionFilter {
    type Entity = RoleAction;

    fn apply(&self, root: &TableRef, scope: &mut Scope, conjunction: &mut Conjunction) {
        value_eq(conjunction, root, "role_id", &self.role_id);
        value_eq(conjunction, root, "action_id", &self.action_id);
        if let Some(role) = &self.role {
            if let Some(exists) = exists_referenced(root, "role_id", role, scope) {
                conjunction.and(exists);
            }
        }
        if let Some(action) = &self.action {
            if let Some(exists) = exists_referenced(root, "action_id", action, scope) {
                conjunction.and(exists);
            }
        }
    }
}

impl CriteriaBuilder<RoleActionFilter> {
    pub fn role_id(mut self, role_id: i64) -> Self {
        self.filter.role_id = Some(role_id);
        self
    }

    pub fn action_id(mut self, action_id: i64) -> Self {
        self.filter.action_id = Some(action_id);
        self
    }

    pub fn role(mut self, role: RoleCriteria) -> Self {
        self.filter.role = Some(Box::new(role));
        self
    }

    pub fn action(mut self, action: ActionCriteria) -> Self {
        self.filter.action = Some(Box::new(action));
        self
    }
}
