use chrono::NaiveDateTime;

use projectx_entity::administrator::AdministratorLoginHistory;

use super::administrator::AdministratorCriteria;
use super::base::{Criteria, CriteriaBuilder, Filter, date_range, text_eq, value_eq};
use super::nested::exists_referenced;
use crate::query::{Conjunction, Scope, TableRef};

pub type LoginHistoryCriteria = Criteria<LoginHistoryFilter>;

#[derive(Debug, Clone, Default)]
pub struct LoginHistoryFilter {
    pub administrator_id: Option<i64>,
    pub ip_address: Option<String>,
    pub os: Option<String>,
    pub client_agent: Option<String>,
    pub login_date_from: Option<NaiveDateTime>,
    pub login_date_to: Option<NaiveDateTime>,
    pub administrator: Option<Box<AdministratorCriteria>>,
}

impl Filter for LoginHistoryFilter {
    type Entity = AdministratorLoginHistory;

    fn apply(&self, root: &TableRef, scope: &mut Scope, conjunction: &mut Conjunction) {
        value_eq(conjunction, root, "admin_id", &self.administrator_id);
        text_eq(conjunction, root, "ip_address", &self.ip_address);
        text_eq(conjunction, root, "os", &self.os);
        text_eq(conjunction, root, "client_agent", &self.client_agent);
        date_range(
            conjunction,
            root,
            "login_date",
            self.login_date_from,
            self.login_date_to,
        );
        if let Some(administrator) = &self.administrator {
            if let Some(exists) = exists_referenced(root, "admin_id", administrator, scope) {
                conjunction.and(exists);
            }
        }
    }
}

impl CriteriaBuilder<LoginHistoryFilter> {
    pub fn administrator_id(mut self, administrator_id: i64) -> Self {
        self.filter.administrator_id = Some(administrator_id);
        self
    }

    pub fn ip_address(mut self, ip_address: impl Into<String>) -> Self {
        self.filter.ip_address = Some(ip_address.into());
        self
    }

    pub fn os(mut self, os: impl Into<String>) -> Self {
        self.filter.os = Some(os.into());
        self
    }

    pub fn client_agent(mut self, client_agent: impl Into<String>) -> Self {
        self.filter.client_agent = Some(client_agent.into());
        self
    }

    /// Inclusive login date bounds.
    pub fn login_between(mut self, from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> Self {
        self.filter.login_date_from = from;
        self.filter.login_date_to = to;
        self
    }

    pub fn administrator(mut self, administrator: AdministratorCriteria) -> Self {
        self.filter.administrator = Some(Box::new(administrator));
        self
    }
}
