//! Link-table maintenance shared by the role and administrator services.

use std::collections::BTreeSet;

use indexmap::IndexSet;
use tracing::debug;

use projectx_core::{AppError, AppResult};
use projectx_database::{Criteria, CriteriaRepository, FetchGraph, Filter, Store};
use projectx_entity::Entity;

/// Target ids added to and removed from an owner's links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkChanges {
    /// Targets linked by this call, in request order.
    pub added: Vec<i64>,
    /// Targets unlinked by this call, ascending.
    pub removed: Vec<i64>,
}

impl LinkChanges {
    /// Whether the links were already in the requested state.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// How one side of a link table is read and written.
///
/// The same table can be owned from either end: administrator roles are
/// synced per administrator and per role.
pub(crate) struct LinkSide<F: Filter> {
    pub owned_by: fn(i64) -> AppResult<Criteria<F>>,
    pub target_of: fn(&F::Entity) -> i64,
    pub link: fn(i64, i64) -> F::Entity,
}

/// Requested ids with duplicates dropped, first occurrence kept.
pub(crate) fn unique_ids(ids: &[i64]) -> IndexSet<i64> {
    ids.iter().copied().collect()
}

/// Fail with `NotFound` unless every id exists in `G`'s table.
pub(crate) async fn ensure_exist<G: Filter, S: Store + ?Sized>(
    repo: &CriteriaRepository<G>,
    store: &mut S,
    ids: &IndexSet<i64>,
) -> AppResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let criteria = Criteria::<G>::builder()
        .include_ids(ids.iter().copied())
        .build()?;
    let found: BTreeSet<i64> = repo.find_ids(store, &criteria).await?.into_iter().collect();
    let missing: Vec<i64> = ids.iter().copied().filter(|id| !found.contains(id)).collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::not_found(format!(
            "{} not found: {missing:?}",
            <G::Entity as Entity>::meta().name
        )))
    }
}

/// Insert one link per target for a freshly created owner.
pub(crate) async fn create_links<F: Filter, S: Store + ?Sized>(
    repo: &CriteriaRepository<F>,
    store: &mut S,
    side: &LinkSide<F>,
    owner: i64,
    targets: &IndexSet<i64>,
    created_by: i64,
) -> AppResult<Vec<F::Entity>> {
    let links = targets.iter().map(|&target| (side.link)(owner, target)).collect();
    repo.create_all(store, links, created_by).await
}

/// Make the owner's links match `desired`: delete the obsolete rows, then
/// insert the missing ones. Links already present are left untouched.
pub(crate) async fn sync_links<F: Filter, S: Store + ?Sized>(
    repo: &CriteriaRepository<F>,
    store: &mut S,
    side: &LinkSide<F>,
    owner: i64,
    desired: &IndexSet<i64>,
    updated_by: i64,
) -> AppResult<LinkChanges> {
    let meta = <F::Entity as Entity>::meta();
    let existing = repo
        .find_all(store, &(side.owned_by)(owner)?, &FetchGraph::none(meta))
        .await?;

    let mut kept = BTreeSet::new();
    let mut obsolete_rows = Vec::new();
    let mut removed = Vec::new();
    for link in &existing {
        let target = (side.target_of)(link);
        if desired.contains(&target) {
            kept.insert(target);
        } else if let Some(id) = link.id() {
            obsolete_rows.push(id);
            removed.push(target);
        }
    }

    // An empty id list would match every row.
    if !obsolete_rows.is_empty() {
        let criteria = Criteria::<F>::builder().include_ids(obsolete_rows).build()?;
        repo.delete_by_criteria(store, &criteria).await?;
    }

    let added: Vec<i64> = desired
        .iter()
        .copied()
        .filter(|target| !kept.contains(target))
        .collect();
    let links = added.iter().map(|&target| (side.link)(owner, target)).collect();
    repo.create_all(store, links, updated_by).await?;

    removed.sort_unstable();
    debug!(
        entity = meta.name,
        owner,
        added = added.len(),
        removed = removed.len(),
        "Links synced"
    );
    Ok(LinkChanges { added, removed })
}
