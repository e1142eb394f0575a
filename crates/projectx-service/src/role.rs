//! Role management: creation with grants and members, relation sync, and
//! role names per action.

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use projectx_core::{AppError, AppResult};
use projectx_database::criteria::{
    ActionCriteria, AdministratorRoleCriteria, AdministratorRoleFilter, RoleActionCriteria,
    RoleActionFilter, RoleCriteria,
};
use projectx_database::repositories::{
    ActionRepository, AdministratorRepository, AdministratorRoleRepository, RoleActionRepository,
    RoleRepository,
};
use projectx_database::{FetchGraph, RepositoryPolicy, Store, UpdateSpec};
use projectx_entity::action::RoleAction;
use projectx_entity::role::model::ROLE;
use projectx_entity::role::{AdministratorRole, Role};

use crate::links::{self, LinkChanges, LinkSide};

/// Grants of one role, owned by the role.
const ROLE_GRANTS: LinkSide<RoleActionFilter> = LinkSide {
    owned_by: |role_id| RoleActionCriteria::builder().role_id(role_id).build(),
    target_of: |link| link.action_id,
    link: RoleAction::new,
};

/// Members of one role, owned by the role.
const ROLE_MEMBERS: LinkSide<AdministratorRoleFilter> = LinkSide {
    owned_by: |role_id| AdministratorRoleCriteria::builder().role_id(role_id).build(),
    target_of: |link| link.administrator_id,
    link: |role_id, administrator_id| AdministratorRole::new(administrator_id, role_id),
};

/// Link changes made by [`RoleService::update_with_relations`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleLinkChanges {
    /// Granted action ids.
    pub actions: LinkChanges,
    /// Member administrator ids.
    pub administrators: LinkChanges,
}

/// Handles roles together with their action grants and members.
#[derive(Debug, Clone)]
pub struct RoleService {
    /// Role repository.
    roles: RoleRepository,
    /// Action repository, for validating grants.
    actions: ActionRepository,
    /// Administrator repository, for validating members.
    administrators: AdministratorRepository,
    /// Role to action links.
    role_actions: RoleActionRepository,
    /// Administrator to role links.
    administrator_roles: AdministratorRoleRepository,
}

impl RoleService {
    /// Creates a role service whose repositories share `policy`.
    pub fn new(policy: RepositoryPolicy) -> Self {
        Self {
            roles: RoleRepository::new(policy),
            actions: ActionRepository::new(policy),
            administrators: AdministratorRepository::new(policy),
            role_actions: RoleActionRepository::new(policy),
            administrator_roles: AdministratorRoleRepository::new(policy),
        }
    }

    /// The underlying role repository.
    pub fn repository(&self) -> &RoleRepository {
        &self.roles
    }

    /// Creates a role, grants it `action_ids` and assigns it to
    /// `administrator_ids`. Every link row is stamped with `created_by`.
    ///
    /// The returned role carries the created links.
    pub async fn create<S: Store + ?Sized>(
        &self,
        store: &mut S,
        role: Role,
        action_ids: &[i64],
        administrator_ids: &[i64],
        created_by: i64,
    ) -> AppResult<Role> {
        let action_ids = links::unique_ids(action_ids);
        let administrator_ids = links::unique_ids(administrator_ids);
        links::ensure_exist(&self.actions, store, &action_ids).await?;
        links::ensure_exist(&self.administrators, store, &administrator_ids).await?;

        let mut role = self.roles.create(store, role, created_by).await?;
        let role_id = role
            .audit
            .id
            .ok_or_else(|| AppError::internal("Created role has no id"))?;

        let grants = links::create_links(
            &self.role_actions,
            store,
            &ROLE_GRANTS,
            role_id,
            &action_ids,
            created_by,
        )
        .await?;
        let members = links::create_links(
            &self.administrator_roles,
            store,
            &ROLE_MEMBERS,
            role_id,
            &administrator_ids,
            created_by,
        )
        .await?;

        info!(
            role_id,
            app_name = %role.app_name,
            name = %role.name,
            actions = grants.len(),
            administrators = members.len(),
            "Role created"
        );
        role.role_actions = Some(grants);
        role.administrator_roles = Some(members);
        Ok(role)
    }

    /// Applies `spec` to the role, then makes its grants and members match
    /// `action_ids` and `administrator_ids` exactly.
    ///
    /// Fails with `NotFound` when the role or any linked id does not exist;
    /// nothing is written in that case.
    pub async fn update_with_relations<S: Store + ?Sized>(
        &self,
        store: &mut S,
        role_id: i64,
        spec: &UpdateSpec<Role>,
        action_ids: &[i64],
        administrator_ids: &[i64],
        updated_by: i64,
    ) -> AppResult<RoleLinkChanges> {
        let action_ids = links::unique_ids(action_ids);
        let administrator_ids = links::unique_ids(administrator_ids);

        links::ensure_exist(&self.actions, store, &action_ids).await?;
        links::ensure_exist(&self.administrators, store, &administrator_ids).await?;
        if self.roles.update_by_id(store, spec, role_id, updated_by).await? == 0 {
            return Err(AppError::not_found(format!("Role {role_id} not found")));
        }

        let changes = RoleLinkChanges {
            actions: links::sync_links(
                &self.role_actions,
                store,
                &ROLE_GRANTS,
                role_id,
                &action_ids,
                updated_by,
            )
            .await?,
            administrators: links::sync_links(
                &self.administrator_roles,
                store,
                &ROLE_MEMBERS,
                role_id,
                &administrator_ids,
                updated_by,
            )
            .await?,
        };

        info!(
            role_id,
            actions_added = changes.actions.added.len(),
            actions_removed = changes.actions.removed.len(),
            administrators_added = changes.administrators.added.len(),
            administrators_removed = changes.administrators.removed.len(),
            "Role updated"
        );
        Ok(changes)
    }

    /// Names of the `app_name` roles granted each of `action_ids`.
    ///
    /// Actions no role is granted are absent from the map.
    pub async fn select_role_names_by_action_ids<S: Store + ?Sized>(
        &self,
        store: &mut S,
        action_ids: &BTreeSet<i64>,
        app_name: &str,
    ) -> AppResult<BTreeMap<i64, BTreeSet<String>>> {
        if action_ids.is_empty() {
            return Err(AppError::validation("At least one action id is required"));
        }
        if app_name.trim().is_empty() {
            return Err(AppError::validation("Application name is required"));
        }

        let criteria = RoleCriteria::builder()
            .app_name(app_name)
            .action(
                ActionCriteria::builder()
                    .include_ids(action_ids.iter().copied())
                    .app_name(app_name)
                    .build()?,
            )
            .build()?;
        let graph = FetchGraph::parse(&ROLE, "roleActions")?;
        let roles = self.roles.find_all(store, &criteria, &graph).await?;

        let mut names: BTreeMap<i64, BTreeSet<String>> = BTreeMap::new();
        for role in &roles {
            for grant in role.role_actions.iter().flatten() {
                if action_ids.contains(&grant.action_id) {
                    names
                        .entry(grant.action_id)
                        .or_default()
                        .insert(role.name.clone());
                }
            }
        }
        Ok(names)
    }
}
