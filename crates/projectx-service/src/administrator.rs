//! Administrator management with role assignment.

use tracing::info;

use projectx_core::{AppError, AppResult};
use projectx_database::criteria::{AdministratorRoleCriteria, AdministratorRoleFilter};
use projectx_database::repositories::{
    AdministratorRepository, AdministratorRoleRepository, RoleRepository,
};
use projectx_database::{RepositoryPolicy, Store, UpdateSpec};
use projectx_entity::administrator::Administrator;
use projectx_entity::role::AdministratorRole;

use crate::links::{self, LinkChanges, LinkSide};

/// Roles of one administrator, owned by the administrator.
const ADMINISTRATOR_ROLES: LinkSide<AdministratorRoleFilter> = LinkSide {
    owned_by: |administrator_id| {
        AdministratorRoleCriteria::builder()
            .administrator_id(administrator_id)
            .build()
    },
    target_of: |link| link.role_id,
    link: AdministratorRole::new,
};

/// Handles administrators together with their role assignments.
#[derive(Debug, Clone)]
pub struct AdministratorService {
    /// Administrator repository.
    administrators: AdministratorRepository,
    /// Role repository, for validating assignments.
    roles: RoleRepository,
    /// Administrator to role links.
    administrator_roles: AdministratorRoleRepository,
}

impl AdministratorService {
    /// Creates an administrator service whose repositories share `policy`.
    pub fn new(policy: RepositoryPolicy) -> Self {
        Self {
            administrators: AdministratorRepository::new(policy),
            roles: RoleRepository::new(policy),
            administrator_roles: AdministratorRoleRepository::new(policy),
        }
    }

    /// The underlying administrator repository.
    pub fn repository(&self) -> &AdministratorRepository {
        &self.administrators
    }

    /// Creates an administrator holding `role_ids`. Repeated ids are linked
    /// once, in first-seen order.
    pub async fn create<S: Store + ?Sized>(
        &self,
        store: &mut S,
        administrator: Administrator,
        role_ids: &[i64],
        created_by: i64,
    ) -> AppResult<Administrator> {
        let role_ids = links::unique_ids(role_ids);
        links::ensure_exist(&self.roles, store, &role_ids).await?;

        let mut administrator = self.administrators.create(store, administrator, created_by).await?;
        let administrator_id = administrator
            .audit
            .id
            .ok_or_else(|| AppError::internal("Created administrator has no id"))?;
        let assignments = links::create_links(
            &self.administrator_roles,
            store,
            &ADMINISTRATOR_ROLES,
            administrator_id,
            &role_ids,
            created_by,
        )
        .await?;

        info!(
            administrator_id,
            login_id = %administrator.login_id,
            roles = assignments.len(),
            "Administrator created"
        );
        administrator.administrator_roles = Some(assignments);
        Ok(administrator)
    }

    /// Applies `spec` to the administrator, then makes its roles match
    /// `role_ids` exactly.
    ///
    /// Fails with `NotFound` when the administrator or any role does not
    /// exist; nothing is written in that case.
    pub async fn update_with_roles<S: Store + ?Sized>(
        &self,
        store: &mut S,
        administrator_id: i64,
        spec: &UpdateSpec<Administrator>,
        role_ids: &[i64],
        updated_by: i64,
    ) -> AppResult<LinkChanges> {
        let role_ids = links::unique_ids(role_ids);
        links::ensure_exist(&self.roles, store, &role_ids).await?;
        if self
            .administrators
            .update_by_id(store, spec, administrator_id, updated_by)
            .await?
            == 0
        {
            return Err(AppError::not_found(format!(
                "Administrator {administrator_id} not found"
            )));
        }

        let changes = links::sync_links(
            &self.administrator_roles,
            store,
            &ADMINISTRATOR_ROLES,
            administrator_id,
            &role_ids,
            updated_by,
        )
        .await?;
        info!(
            administrator_id,
            roles_added = changes.added.len(),
            roles_removed = changes.removed.len(),
            "Administrator updated"
        );
        Ok(changes)
    }
}
