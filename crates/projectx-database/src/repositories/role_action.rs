use projectx_core::AppResult;
use projectx_core::types::SortDirection;
use projectx_entity::ValueKind;
use projectx_entity::action::role_action::ROLE_ACTION;

use super::base::CriteriaRepository;
use crate::criteria::RoleActionFilter;
use crate::query::{OrderTerm, Predicate, Projection, Scope, Select, Selected};
use crate::store::{Store, fetch_ints};

pub type RoleActionRepository = CriteriaRepository<RoleActionFilter>;

impl CriteriaRepository<RoleActionFilter> {
    /// Ids of the actions granted to a role, ascending.
    pub async fn find_action_ids_by_role_id<S: Store + ?Sized>(
        &self,
        store: &mut S,
        role_id: i64,
    ) -> AppResult<Vec<i64>> {
        let mut scope = Scope::new();
        let root = scope.bind(&ROLE_ACTION);
        let action_id = root.col("action_id");
        let select = Select::new(
            root.clone(),
            Projection::Columns(vec![Selected {
                column: action_id.clone(),
                kind: ValueKind::Int,
            }]),
        )
        .filter(Some(Predicate::eq(root.col("role_id"), role_id)))
        .order_by(vec![OrderTerm::column(action_id, SortDirection::Asc)]);
        fetch_ints(store, &select).await
    }
}
