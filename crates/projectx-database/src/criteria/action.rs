use projectx_entity::action::role_action::ROLE_ACTION;
use projectx_entity::action::{Action, ActionType};

use super::base::{Criteria, CriteriaBuilder, Filter, text_eq, value_eq};
use super::nested::exists_via_link;
use super::role::RoleCriteria;
use crate::query::{Conjunction, Scope, TableRef};

pub type ActionCriteria = Criteria<ActionFilter>;

#[derive(Debug, Clone, Default)]
pub struct ActionFilter {
    pub app_name: Option<String>,
    pub page: Option<String>,
    pub action_name: Option<String>,
    pub display_name: Option<String>,
    pub action_type: Option<ActionType>,
    pub url: Option<String>,
    /// Actions granted by at least one matching role.
    pub role: Option<Box<RoleCriteria>>,
}

impl Filter for ActionFilter {
    type Entity = Action;

    fn apply(&self, root: &TableRef, scope: &mut Scope, conjunction: &mut Conjunction) {
        text_eq(conjunction, root, "app_name", &self.app_name);
        text_eq(conjunction, root, "page", &self.page);
        text_eq(conjunction, root, "action_name", &self.action_name);
        text_eq(conjunction, root, "display_name", &self.display_name);
        value_eq(conjunction, root, "action_type", &self.action_type);
        text_eq(conjunction, root, "url", &self.url);
        if let Some(role) = &self.role {
            if let Some(exists) =
                exists_via_link(root, &ROLE_ACTION, "action_id", "role_id", role, scope)
            {
                conjunction.and(exists);
            }
        }
    }
}

impl CriteriaBuilder<ActionFilter> {
    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.filter.app_name = Some(app_name.into());
        self
    }

    pub fn page_name(mut self, page: impl Into<String>) -> Self {
        self.filter.page = Some(page.into());
        self
    }

    pub fn action_name(mut self, action_name: impl Into<String>) -> Self {
        self.filter.action_name = Some(action_name.into());
        self
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.filter.display_name = Some(display_name.into());
        self
    }

    pub fn action_type(mut self, action_type: ActionType) -> Self {
        self.filter.action_type = Some(action_type);
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.filter.url = Some(url.into());
        self
    }

    pub fn role(mut self, role: RoleCriteria) -> Self {
        self.filter.role = Some(Box::new(role));
        self
    }
}
