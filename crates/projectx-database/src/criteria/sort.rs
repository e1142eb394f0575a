//! Sort key resolution.
//!
//! Keys are resolved against the entity registry when a criteria is built,
//! so a bad key fails before any statement reaches a store.

use indexmap::IndexMap;

use projectx_core::types::{SortDirection, SortOrder};
use projectx_core::{AppError, AppResult};
use projectx_entity::{EntityMeta, RelationDef};

use crate::query::{OrderExpr, OrderTerm, Scope, TableRef};

/// Requested sort keys in insertion order. Re-adding a key replaces its
/// direction but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortKeys(IndexMap<String, SortDirection>);

impl SortKeys {
    pub fn insert(&mut self, key: impl Into<String>, direction: SortDirection) {
        self.0.insert(key.into(), direction);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn resolve(&self, meta: &'static EntityMeta) -> AppResult<Vec<ResolvedSort>> {
        self.0
            .iter()
            .map(|(key, direction)| resolve_key(meta, key, *direction))
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum SortTarget {
    /// A column of the root table.
    Column(&'static str),
    /// A column of a to-one related table.
    Related {
        relation: &'static RelationDef,
        column: &'static str,
    },
}

/// A validated sort key.
#[derive(Debug, Clone)]
pub struct ResolvedSort {
    pub property: String,
    pub target: SortTarget,
    pub direction: SortDirection,
}

impl ResolvedSort {
    fn is_id(&self) -> bool {
        matches!(self.target, SortTarget::Column(column) if column == EntityMeta::ID)
    }
}

/// Resolve one sort key such as `name` or `administrator.name`.
pub fn resolve_key(
    meta: &'static EntityMeta,
    key: &str,
    direction: SortDirection,
) -> AppResult<ResolvedSort> {
    let segments: Vec<&str> = key.split('.').collect();
    let (last, path) = match segments.split_last() {
        Some(split) => split,
        None => return Err(unknown(meta, key)),
    };

    let mut current = meta;
    for segment in path {
        match current.relation(segment) {
            Some(relation) if relation.is_collection() => {
                return Err(AppError::unsafe_ordering(meta.name, key));
            }
            Some(relation) => current = relation.target,
            None => return Err(unknown(meta, key)),
        }
    }

    if let Some(relation) = current.relation(last) {
        if relation.is_collection() {
            return Err(AppError::unsafe_ordering(meta.name, key));
        }
        return Err(AppError::invalid_field(
            meta.name,
            key,
            format!(
                "Sort key '{key}' on {} names a relation; sort by one of its properties",
                meta.name
            ),
        ));
    }

    let field = current.field(last).ok_or_else(|| unknown(meta, key))?;
    if !field.orderable {
        return Err(AppError::invalid_field(
            meta.name,
            key,
            format!("Property '{key}' of {} is not orderable", meta.name),
        ));
    }

    let target = match path {
        [] => SortTarget::Column(field.column),
        [relation] => SortTarget::Related {
            relation: meta.relation(relation).ok_or_else(|| unknown(meta, key))?,
            column: field.column,
        },
        _ => {
            return Err(AppError::invalid_field(
                meta.name,
                key,
                format!("Sort key '{key}' on {} crosses more than one relation", meta.name),
            ));
        }
    };

    Ok(ResolvedSort {
        property: key.to_string(),
        target,
        direction,
    })
}

/// ORDER BY terms for `sorts` on `root`.
///
/// No keys orders by id descending. Otherwise id ascending is appended as a
/// tie-breaker unless a key already orders by id.
pub fn order_terms(sorts: &[ResolvedSort], root: &TableRef, scope: &mut Scope) -> Vec<OrderTerm> {
    if sorts.is_empty() {
        return vec![OrderTerm::column(root.id(), SortDirection::Desc)];
    }
    let mut terms: Vec<OrderTerm> = sorts
        .iter()
        .map(|sort| match sort.target {
            SortTarget::Column(column) => OrderTerm::column(root.col(column), sort.direction),
            SortTarget::Related { relation, column } => OrderTerm {
                expr: OrderExpr::Related {
                    target: scope.bind(relation.target),
                    key: relation.remote_column,
                    foreign_key: root.col(relation.local_column),
                    column,
                },
                direction: sort.direction,
            },
        })
        .collect();
    if !sorts.iter().any(ResolvedSort::is_id) {
        terms.push(OrderTerm::column(root.id(), SortDirection::Asc));
    }
    terms
}

/// The effective sort, as reported in a page.
pub fn sort_orders(sorts: &[ResolvedSort]) -> Vec<SortOrder> {
    if sorts.is_empty() {
        return vec![SortOrder::desc(EntityMeta::ID)];
    }
    sorts
        .iter()
        .map(|sort| SortOrder::new(sort.property.clone(), sort.direction))
        .collect()
}

fn unknown(meta: &EntityMeta, key: &str) -> AppError {
    AppError::invalid_field(
        meta.name,
        key,
        format!("Unknown sort property '{key}' for {}", meta.name),
    )
}

#[cfg(test)]
mod tests {
    use projectx_core::ErrorKind;
    use projectx_entity::administrator::login_history::LOGIN_HISTORY;
    use projectx_entity::administrator::model::ADMINISTRATOR;
    use projectx_entity::role::model::ROLE;

    use super::*;

    #[test]
    fn test_to_many_paths_are_unsafe() {
        for key in ["roleActions", "roleActions.id", "administratorRoles.administrator.name"] {
            let err = resolve_key(&ROLE, key, SortDirection::Asc).unwrap_err();
            assert_eq!(err.kind, ErrorKind::UnsafeOrdering, "{key}");
        }
    }

    #[test]
    fn test_to_many_behind_to_one_is_unsafe() {
        let err = resolve_key(&LOGIN_HISTORY, "administrator.loginHistories", SortDirection::Asc)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsafeOrdering);
    }

    #[test]
    fn test_unknown_and_unorderable_keys_are_configuration_errors() {
        let err = resolve_key(&ADMINISTRATOR, "nickname", SortDirection::Asc).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.message.contains("nickname"));
        assert!(err.message.contains("Administrator"));

        let err = resolve_key(&ADMINISTRATOR, "password", SortDirection::Asc).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);

        let err = resolve_key(&LOGIN_HISTORY, "administrator", SortDirection::Asc).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_to_one_property_resolves_to_related_column() {
        let sort = resolve_key(&LOGIN_HISTORY, "administrator.name", SortDirection::Desc).unwrap();
        match sort.target {
            SortTarget::Related { relation, column } => {
                assert_eq!(relation.name, "administrator");
                assert_eq!(column, "name");
            }
            SortTarget::Column(_) => panic!("expected a related sort"),
        }
    }

    #[test]
    fn test_repeated_key_keeps_first_position() {
        let mut keys = SortKeys::default();
        keys.insert("name", SortDirection::Asc);
        keys.insert("appName", SortDirection::Asc);
        keys.insert("name", SortDirection::Desc);
        let sorts = keys.resolve(&ROLE).unwrap();
        assert_eq!(sorts[0].property, "name");
        assert_eq!(sorts[0].direction, SortDirection::Desc);
        assert_eq!(sorts.len(), 2);
    }

    #[test]
    fn test_tie_breaker_and_default_order() {
        let mut scope = Scope::new();
        let root = scope.bind(&ROLE);

        let terms = order_terms(&[], &root, &mut scope);
        assert_eq!(terms, vec![OrderTerm::column(root.id(), SortDirection::Desc)]);

        let sorts = vec![resolve_key(&ROLE, "name", SortDirection::Asc).unwrap()];
        let terms = order_terms(&sorts, &root, &mut scope);
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[1], OrderTerm::column(root.id(), SortDirection::Asc));

        let sorts = vec![resolve_key(&ROLE, "id", SortDirection::Desc).unwrap()];
        assert_eq!(order_terms(&sorts, &root, &mut scope).len(), 1);
        assert_eq!(sort_orders(&[]), vec![SortOrder::desc("id")]);
    }
}
