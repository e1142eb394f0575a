//! Shared fixtures for service integration tests.

#![allow(dead_code)]

use projectx_database::criteria::AdministratorRoleCriteria;
use projectx_database::repositories::{
    ActionRepository, AdministratorRepository, AdministratorRoleRepository, RoleActionRepository,
    RoleRepository,
};
use projectx_database::{FetchGraph, MemoryStore, RepositoryPolicy};
use projectx_entity::SCHEMA;
use projectx_entity::action::{Action, ActionType};
use projectx_entity::administrator::Administrator;
use projectx_entity::role::Role;
use projectx_entity::role::administrator_role::ADMINISTRATOR_ROLE;

/// Id recorded as `created_by` for seeded rows.
pub const SEED_USER: i64 = 1;

/// An in-memory admin database.
pub struct Fixture {
    pub store: MemoryStore,
    pub policy: RepositoryPolicy,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(SCHEMA),
            policy: RepositoryPolicy::default(),
        }
    }

    pub async fn administrator(&mut self, login_id: &str) -> i64 {
        AdministratorRepository::new(self.policy)
            .create(
                &mut self.store,
                Administrator::new(login_id.to_uppercase(), login_id, "secret"),
                SEED_USER,
            )
            .await
            .expect("Failed to create administrator")
            .audit
            .id
            .expect("administrator id")
    }

    pub async fn role(&mut self, app_name: &str, name: &str) -> i64 {
        RoleRepository::new(self.policy)
            .create(&mut self.store, Role::new(app_name, name), SEED_USER)
            .await
            .expect("Failed to create role")
            .audit
            .id
            .expect("role id")
    }

    pub async fn action(
        &mut self,
        app_name: &str,
        page: &str,
        action_name: &str,
        action_type: ActionType,
    ) -> i64 {
        let mut action = Action::new(
            app_name,
            page,
            action_name,
            format!("/{app_name}/{page}/{action_name}"),
        );
        action.action_type = action_type;
        ActionRepository::new(self.policy)
            .create(&mut self.store, action, SEED_USER)
            .await
            .expect("Failed to create action")
            .audit
            .id
            .expect("action id")
    }

    /// Action ids granted to a role, ascending.
    pub async fn granted_actions(&mut self, role_id: i64) -> Vec<i64> {
        RoleActionRepository::new(self.policy)
            .find_action_ids_by_role_id(&mut self.store, role_id)
            .await
            .expect("Failed to read grants")
    }

    /// Role ids held by an administrator, ascending.
    pub async fn held_roles(&mut self, administrator_id: i64) -> Vec<i64> {
        AdministratorRoleRepository::new(self.policy)
            .find_role_ids_by_administrator_id(&mut self.store, administrator_id)
            .await
            .expect("Failed to read role assignments")
    }

    /// Administrator ids assigned to a role, ascending.
    pub async fn members(&mut self, role_id: i64) -> Vec<i64> {
        let criteria = AdministratorRoleCriteria::builder()
            .role_id(role_id)
            .build()
            .expect("criteria");
        let mut members: Vec<i64> = AdministratorRoleRepository::new(self.policy)
            .find_all(&mut self.store, &criteria, &FetchGraph::none(&ADMINISTRATOR_ROLE))
            .await
            .expect("Failed to read members")
            .into_iter()
            .map(|link| link.administrator_id)
            .collect();
        members.sort_unstable();
        members
    }
}
