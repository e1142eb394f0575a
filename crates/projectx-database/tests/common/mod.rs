//! Shared fixtures for repository integration tests.

#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};

use projectx_database::repositories::{
    ActionRepository, AdministratorRepository, AdministratorRoleRepository, LoginHistoryRepository,
    RoleActionRepository, RoleRepository,
};
use projectx_database::{MemoryStore, RefetchOrdering, RepositoryPolicy};
use projectx_entity::SCHEMA;
use projectx_entity::action::{Action, RoleAction};
use projectx_entity::administrator::{Administrator, AdministratorLoginHistory};
use projectx_entity::role::{AdministratorRole, Role};

/// Id recorded as `created_by` for seeded rows.
pub const SEED_USER: i64 = 1;

/// An in-memory database with every admin table and typed repositories.
pub struct TestDb {
    pub store: MemoryStore,
    pub policy: RepositoryPolicy,
}

impl TestDb {
    pub fn new() -> Self {
        Self::with_policy(RepositoryPolicy::default())
    }

    pub fn with_policy(policy: RepositoryPolicy) -> Self {
        Self {
            store: MemoryStore::new(SCHEMA),
            policy,
        }
    }

    pub fn with_refetch_ordering(ordering: RefetchOrdering) -> Self {
        Self {
            store: MemoryStore::new(SCHEMA).with_refetch_ordering(ordering),
            policy: RepositoryPolicy::default(),
        }
    }

    pub fn administrators(&self) -> AdministratorRepository {
        AdministratorRepository::new(self.policy)
    }

    pub fn roles(&self) -> RoleRepository {
        RoleRepository::new(self.policy)
    }

    pub fn actions(&self) -> ActionRepository {
        ActionRepository::new(self.policy)
    }

    pub fn administrator_roles(&self) -> AdministratorRoleRepository {
        AdministratorRoleRepository::new(self.policy)
    }

    pub fn role_actions(&self) -> RoleActionRepository {
        RoleActionRepository::new(self.policy)
    }

    pub fn login_histories(&self) -> LoginHistoryRepository {
        LoginHistoryRepository::new(self.policy)
    }

    pub async fn administrator(&mut self, name: &str, login_id: &str) -> Administrator {
        self.administrators()
            .create(&mut self.store, Administrator::new(name, login_id, "secret"), SEED_USER)
            .await
            .expect("Failed to create administrator")
    }

    pub async fn role(&mut self, app_name: &str, name: &str) -> Role {
        self.roles()
            .create(&mut self.store, Role::new(app_name, name), SEED_USER)
            .await
            .expect("Failed to create role")
    }

    pub async fn action(&mut self, app_name: &str, page: &str, action_name: &str) -> Action {
        let url = format!("/{app_name}/{page}/{action_name}");
        self.actions()
            .create(
                &mut self.store,
                Action::new(app_name, page, action_name, url),
                SEED_USER,
            )
            .await
            .expect("Failed to create action")
    }

    pub async fn assign_role(&mut self, administrator_id: i64, role_id: i64) -> AdministratorRole {
        self.administrator_roles()
            .create(
                &mut self.store,
                AdministratorRole::new(administrator_id, role_id),
                SEED_USER,
            )
            .await
            .expect("Failed to assign role")
    }

    pub async fn grant_action(&mut self, role_id: i64, action_id: i64) -> RoleAction {
        self.role_actions()
            .create(&mut self.store, RoleAction::new(role_id, action_id), SEED_USER)
            .await
            .expect("Failed to grant action")
    }

    pub async fn login(
        &mut self,
        administrator_id: i64,
        ip_address: &str,
        login_date: NaiveDateTime,
    ) -> AdministratorLoginHistory {
        let mut history = AdministratorLoginHistory::new(administrator_id, login_date);
        history.ip_address = Some(ip_address.to_string());
        self.login_histories()
            .create(&mut self.store, history, SEED_USER)
            .await
            .expect("Failed to record login")
    }
}

/// A fixed timestamp `days` days after 2024-01-01.
pub fn day(days: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .expect("valid date")
        + Duration::days(days)
}

/// Ids of `entities`, in order.
pub fn ids<E: projectx_entity::Entity>(entities: &[E]) -> Vec<i64> {
    entities.iter().filter_map(|e| e.id()).collect()
}
