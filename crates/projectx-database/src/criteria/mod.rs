//! Typed criteria for every entity.
//!
//! A criteria is assembled with a builder, frozen by `build()`, and then
//! compiled into a [`Predicate`](crate::query::Predicate) against a table
//! alias. Unset filters contribute nothing.

pub mod action;
pub mod administrator;
pub mod administrator_role;
pub mod base;
pub mod login_history;
pub mod nested;
pub mod paging;
pub mod role;
pub mod role_action;
pub mod sort;

pub use action::{ActionCriteria, ActionFilter};
pub use administrator::{AdministratorCriteria, AdministratorFilter};
pub use administrator_role::{AdministratorRoleCriteria, AdministratorRoleFilter};
pub use base::{AuditFilter, Criteria, CriteriaBuilder, Filter};
pub use login_history::{LoginHistoryCriteria, LoginHistoryFilter};
pub use paging::{PageWindow, Paging, PagingPolicy};
pub use role::{RoleCriteria, RoleFilter};
pub use role_action::{RoleActionCriteria, RoleActionFilter};
pub use sort::{ResolvedSort, SortKeys, SortTarget};

#[cfg(test)]
mod tests {
    use projectx_core::ErrorKind;
    use projectx_core::types::SortDirection;
    use projectx_entity::administrator::AdministratorStatus;
    use projectx_entity::administrator::model::ADMINISTRATOR;
    use projectx_entity::administrator::login_history::LOGIN_HISTORY;
    use projectx_entity::role::model::ROLE;

    use super::*;
    use crate::query::{Scope, Select, sql};

    fn where_clause<F: Filter>(criteria: &Criteria<F>) -> String {
        let mut scope = Scope::new();
        let root = scope.bind(Criteria::<F>::meta());
        let filter = criteria.predicate(&root, &mut scope);
        sql::select(&Select::ids(root).filter(filter)).sql().to_string()
    }

    #[test]
    fn test_empty_criteria_has_no_predicate() {
        let criteria = AdministratorCriteria::default();
        let mut scope = Scope::new();
        let root = scope.bind(&ADMINISTRATOR);
        assert!(criteria.predicate(&root, &mut scope).is_none());
    }

    #[test]
    fn test_blank_strings_are_ignored() {
        let criteria = AdministratorCriteria::builder()
            .name("   ")
            .login_id("")
            .keyword(" ")
            .build()
            .unwrap();
        assert_eq!(where_clause(&criteria), "SELECT t0.id FROM mjr_admin t0");
    }

    #[test]
    fn test_common_filters() {
        let criteria = RoleCriteria::builder()
            .from_id(10)
            .include_ids([11, 12])
            .exclude_ids([12])
            .created_by(1)
            .build()
            .unwrap();
        assert_eq!(
            where_clause(&criteria),
            "SELECT t0.id FROM mjr_role t0 WHERE t0.id > $1 AND t0.id IN ($2, $3) \
             AND t0.id NOT IN ($4) AND t0.created_by = $5"
        );
    }

    #[test]
    fn test_keyword_spans_keyword_columns() {
        let criteria = AdministratorCriteria::builder()
            .status(AdministratorStatus::Active)
            .keyword("adm")
            .build()
            .unwrap();
        assert_eq!(
            where_clause(&criteria),
            "SELECT t0.id FROM mjr_admin t0 WHERE \
             (t0.name ILIKE $1 ESCAPE '\\' OR t0.login_id ILIKE $2 ESCAPE '\\') AND t0.status = $3"
        );
    }

    #[test]
    fn test_nested_role_filter_compiles_to_exists() {
        let role = RoleCriteria::builder().name("auditor").build().unwrap();
        let criteria = AdministratorCriteria::builder().role(role).build().unwrap();
        assert_eq!(
            where_clause(&criteria),
            "SELECT t0.id FROM mjr_admin t0 WHERE EXISTS (SELECT 1 FROM mjr_admin_x_role t1 \
             INNER JOIN mjr_role t2 ON t2.id = t1.role_id WHERE t1.admin_id = t0.id AND t2.name = $1)"
        );
    }

    #[test]
    fn test_empty_nested_filter_is_omitted() {
        let criteria = AdministratorCriteria::builder()
            .role(RoleCriteria::default())
            .build()
            .unwrap();
        assert_eq!(where_clause(&criteria), "SELECT t0.id FROM mjr_admin t0");

        let nested_empty = RoleCriteria::builder()
            .action(ActionCriteria::default())
            .build()
            .unwrap();
        let criteria = AdministratorCriteria::builder()
            .role(nested_empty)
            .build()
            .unwrap();
        assert_eq!(where_clause(&criteria), "SELECT t0.id FROM mjr_admin t0");
    }

    #[test]
    fn test_referenced_filter_on_join_entity() {
        let administrator = AdministratorCriteria::builder()
            .login_id("root")
            .build()
            .unwrap();
        let criteria = LoginHistoryCriteria::builder()
            .administrator(administrator)
            .os("linux")
            .build()
            .unwrap();
        assert_eq!(
            where_clause(&criteria),
            "SELECT t0.id FROM mjr_admin_login_history t0 WHERE t0.os = $1 \
             AND EXISTS (SELECT 1 FROM mjr_admin t1 WHERE t1.id = t0.admin_id AND t1.login_id = $2)"
        );
        assert_eq!(Criteria::<LoginHistoryFilter>::meta(), &LOGIN_HISTORY);
    }

    #[test]
    fn test_build_rejects_bad_sort_keys() {
        let err = RoleCriteria::builder()
            .sort("roleActions.action.url", SortDirection::Asc)
            .build()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsafeOrdering);

        let criteria = RoleCriteria::builder()
            .sort("appName", SortDirection::Asc)
            .sort("name", SortDirection::Desc)
            .build()
            .unwrap();
        assert_eq!(criteria.sort().len(), 2);
        assert_eq!(Criteria::<RoleFilter>::meta(), &ROLE);
    }
}
