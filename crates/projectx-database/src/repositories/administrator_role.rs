use projectx_core::AppResult;
use projectx_core::types::SortDirection;
use projectx_entity::ValueKind;
use projectx_entity::role::administrator_role::ADMINISTRATOR_ROLE;

use super::base::CriteriaRepository;
use crate::criteria::AdministratorRoleFilter;
use crate::query::{OrderTerm, Predicate, Projection, Scope, Select, Selected};
use crate::store::{Store, fetch_ints};

pub type AdministratorRoleRepository = CriteriaRepository<AdministratorRoleFilter>;

impl CriteriaRepository<AdministratorRoleFilter> {
    /// Ids of the roles held by an administrator, ascending.
    pub async fn find_role_ids_by_administrator_id<S: Store + ?Sized>(
        &self,
        store: &mut S,
        administrator_id: i64,
    ) -> AppResult<Vec<i64>> {
        let mut scope = Scope::new();
        let root = scope.bind(&ADMINISTRATOR_ROLE);
        let role_id = root.col("role_id");
        let select = Select::new(
            root.clone(),
            Projection::Columns(vec![Selected {
                column: role_id.clone(),
                kind: ValueKind::Int,
            }]),
        )
        .filter(Some(Predicate::eq(root.col("admin_id"), administrator_id)))
        .order_by(vec![OrderTerm::column(role_id, SortDirection::Asc)]);
        fetch_ints(store, &select).await
    }
}
