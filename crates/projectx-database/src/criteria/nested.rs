//! Correlated `EXISTS` predicates for criteria on related entities.
//!
//! Nested criteria never join into the outer statement, so the outer row
//! count stays one row per root. A nested criteria that constrains nothing
//! contributes no predicate at all.

use projectx_entity::{Entity, EntityMeta};

use super::base::{Criteria, Filter};
use crate::query::{Join, JoinKind, Predicate, Scope, TableRef};

/// Related rows reached through a link table:
/// `link.owner_column = outer.id` and `target.id = link.target_column`.
pub(crate) fn exists_via_link<G: Filter>(
    outer: &TableRef,
    link: &'static EntityMeta,
    owner_column: &'static str,
    target_column: &'static str,
    nested: &Criteria<G>,
    scope: &mut Scope,
) -> Option<Predicate> {
    let link_ref = scope.bind(link);
    let target = scope.bind(G::Entity::meta());
    let inner = nested.predicate(&target, scope)?;
    let join = Join {
        kind: JoinKind::Inner,
        on: Predicate::ColumnsEqual(target.id(), link_ref.col(target_column)),
        table: target,
    };
    let correlation = Predicate::ColumnsEqual(link_ref.col(owner_column), outer.id());
    Some(Predicate::exists(link_ref, vec![join], correlate(correlation, inner)))
}

/// The row referenced by `outer.foreign_key`.
pub(crate) fn exists_referenced<G: Filter>(
    outer: &TableRef,
    foreign_key: &'static str,
    nested: &Criteria<G>,
    scope: &mut Scope,
) -> Option<Predicate> {
    let target = scope.bind(G::Entity::meta());
    let inner = nested.predicate(&target, scope)?;
    let correlation = Predicate::ColumnsEqual(target.id(), outer.col(foreign_key));
    Some(Predicate::exists(target, Vec::new(), correlate(correlation, inner)))
}

fn correlate(correlation: Predicate, inner: Predicate) -> Predicate {
    let mut clauses = vec![correlation];
    match inner {
        Predicate::And(parts) => clauses.extend(parts),
        other => clauses.push(other),
    }
    Predicate::And(clauses)
}
