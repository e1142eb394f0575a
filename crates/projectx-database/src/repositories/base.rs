//! Generic criteria repository.
//!
//! Every read compiles the criteria against a fresh alias scope. Reads whose
//! fetch graph contains a to-many relation resolve root ids first and refetch
//! the entities by id, so joins never multiply roots or skew paging.

use std::marker::PhantomData;

use tracing::{debug, error, warn};

use projectx_core::config::PersistenceConfig;
use projectx_core::error::BulkProgress;
use projectx_core::types::{Page, SortDirection};
use projectx_core::{AppError, AppResult};
use projectx_entity::base::audit::now;
use projectx_entity::base::hydrate;
use projectx_entity::{Entity, EntityMeta, LoadedNode, Value};

use super::graph::EntityPlan;
use super::update::UpdateSpec;
use crate::criteria::paging::{PageWindow, PagingPolicy};
use crate::criteria::sort::{order_terms, sort_orders};
use crate::criteria::{Criteria, Filter};
use crate::fetch::FetchGraph;
use crate::query::{
    Delete, Insert, Mutation, OrderExpr, OrderTerm, Predicate, Projection, Scope, Select, Update,
};
use crate::store::{RefetchOrdering, Store, fetch_count, fetch_ints};

/// Limits applied by every repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryPolicy {
    pub paging: PagingPolicy,
    /// Ids per bulk `UPDATE`/`DELETE` statement.
    pub bulk_chunk_size: usize,
    /// Largest id list ordered by position in one refetch.
    pub max_rank_ids: usize,
}

impl Default for RepositoryPolicy {
    fn default() -> Self {
        Self::from(&PersistenceConfig::default())
    }
}

impl From<&PersistenceConfig> for RepositoryPolicy {
    fn from(config: &PersistenceConfig) -> Self {
        Self {
            paging: PagingPolicy::from(config),
            bulk_chunk_size: config.bulk_chunk_size,
            max_rank_ids: config.max_rank_ids,
        }
    }
}

enum BulkOp<'a> {
    Update(&'a [(&'static str, Value)]),
    Delete,
}

impl BulkOp<'_> {
    fn name(&self) -> &'static str {
        match self {
            Self::Update(_) => "update",
            Self::Delete => "delete",
        }
    }
}

/// Criteria-driven reads and chunked writes for the entity behind `F`.
///
/// The repository holds no connection. Each call borrows the caller's store,
/// which may be a pooled connection or an open transaction.
#[derive(Debug, Clone)]
pub struct CriteriaRepository<F: Filter> {
    policy: RepositoryPolicy,
    _filter: PhantomData<fn() -> F>,
}

impl<F: Filter> Default for CriteriaRepository<F> {
    fn default() -> Self {
        Self::new(RepositoryPolicy::default())
    }
}

impl<F: Filter> CriteriaRepository<F> {
    pub fn new(policy: RepositoryPolicy) -> Self {
        Self {
            policy,
            _filter: PhantomData,
        }
    }

    pub fn policy(&self) -> &RepositoryPolicy {
        &self.policy
    }

    fn meta() -> &'static EntityMeta {
        F::Entity::meta()
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub async fn find_by_id<S: Store + ?Sized>(
        &self,
        store: &mut S,
        id: i64,
        graph: &FetchGraph,
    ) -> AppResult<Option<F::Entity>> {
        let criteria = Criteria::<F>::builder().id(id).build()?;
        self.find_one(store, &criteria, graph).await
    }

    /// The single entity matching `criteria`.
    ///
    /// Fails with a non-unique error when more than one row matches. Paging
    /// on the criteria is ignored.
    pub async fn find_one<S: Store + ?Sized>(
        &self,
        store: &mut S,
        criteria: &Criteria<F>,
        graph: &FetchGraph,
    ) -> AppResult<Option<F::Entity>> {
        let meta = Self::meta();
        self.check_graph(graph)?;
        debug!(entity = meta.name, op = "find_one", "Executing query");

        let mut nodes = if graph.has_collection() {
            let ids = self.select_ids(store, criteria, None, Some(2)).await?;
            if ids.len() > 1 {
                return Err(AppError::non_unique(meta.name));
            }
            self.refetch(store, &ids, criteria, graph).await?
        } else {
            let nodes = self.fetch_graph(store, criteria, graph, None, Some(2)).await?;
            if nodes.len() > 1 {
                return Err(AppError::non_unique(meta.name));
            }
            nodes
        };
        nodes.pop().map(|node| hydrate(&node)).transpose()
    }

    /// Every entity matching `criteria`.
    ///
    /// A limit without a page number or offset is ignored; requesting an
    /// actual page is a configuration error.
    pub async fn find_all<S: Store + ?Sized>(
        &self,
        store: &mut S,
        criteria: &Criteria<F>,
        graph: &FetchGraph,
    ) -> AppResult<Vec<F::Entity>> {
        let meta = Self::meta();
        self.check_graph(graph)?;
        if criteria.paging().window(&self.policy.paging).is_some() {
            let field = if criteria.paging().page_number.is_some_and(|page| page > 0) {
                "page"
            } else {
                "offset"
            };
            return Err(AppError::invalid_field(
                meta.name,
                field,
                format!(
                    "find_all on {} does not accept '{field}'; use find_by_paging",
                    meta.name
                ),
            ));
        }

        let nodes = if graph.has_collection() {
            let ids = self.find_ids(store, criteria).await?;
            self.refetch(store, &ids, criteria, graph).await?
        } else {
            self.fetch_graph(store, criteria, graph, None, None).await?
        };
        debug!(entity = meta.name, op = "find_all", count = nodes.len(), "Query finished");
        nodes.iter().map(hydrate).collect()
    }

    /// One page of entities matching `criteria`, plus the total match count.
    pub async fn find_by_paging<S: Store + ?Sized>(
        &self,
        store: &mut S,
        criteria: &Criteria<F>,
        graph: &FetchGraph,
    ) -> AppResult<Page<F::Entity>> {
        let meta = Self::meta();
        self.check_graph(graph)?;
        let window = criteria.paging().window(&self.policy.paging).ok_or_else(|| {
            AppError::invalid_field(
                meta.name,
                "page",
                format!(
                    "find_by_paging on {} requires a page number or an offset",
                    meta.name
                ),
            )
        })?;
        let PageWindow { offset, size } = window;

        let nodes = if graph.has_collection() {
            let ids = self
                .select_ids(store, criteria, Some(offset), Some(u64::from(size)))
                .await?;
            debug!(entity = meta.name, op = "find_by_paging", ids = ids.len(), "Resolved page ids");
            self.refetch(store, &ids, criteria, graph).await?
        } else {
            self.fetch_graph(store, criteria, graph, Some(offset), Some(u64::from(size)))
                .await?
        };
        let total = self.count(store, criteria).await?;
        debug!(
            entity = meta.name,
            op = "find_by_paging",
            offset,
            size,
            rows = nodes.len(),
            total,
            "Query finished"
        );

        let data = nodes.iter().map(hydrate).collect::<AppResult<Vec<_>>>()?;
        Ok(Page::new(
            data,
            offset,
            u64::from(size),
            total,
            sort_orders(criteria.sort()),
        ))
    }

    /// Ids of every match, in criteria order.
    pub async fn find_ids<S: Store + ?Sized>(
        &self,
        store: &mut S,
        criteria: &Criteria<F>,
    ) -> AppResult<Vec<i64>> {
        self.select_ids(store, criteria, None, None).await
    }

    /// Number of distinct matching roots.
    pub async fn count<S: Store + ?Sized>(&self, store: &mut S, criteria: &Criteria<F>) -> AppResult<u64> {
        let mut scope = Scope::new();
        let root = scope.bind(Self::meta());
        let filter = criteria.predicate(&root, &mut scope);
        let select = Select::new(root.clone(), Projection::CountDistinct(root.id())).filter(filter);
        fetch_count(store, &select).await
    }

    pub async fn exists<S: Store + ?Sized>(&self, store: &mut S, criteria: &Criteria<F>) -> AppResult<bool> {
        let mut scope = Scope::new();
        let root = scope.bind(Self::meta());
        let filter = criteria.predicate(&root, &mut scope);
        let select = Select::ids(root).filter(filter).window(None, Some(1));
        Ok(!store.fetch(&select).await?.is_empty())
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Insert a new entity, stamping both audit pairs with `created_by`.
    pub async fn create<S: Store + ?Sized>(
        &self,
        store: &mut S,
        mut entity: F::Entity,
        created_by: i64,
    ) -> AppResult<F::Entity> {
        let meta = Self::meta();
        if let Some(id) = entity.id() {
            return Err(AppError::validation(format!(
                "{} already has id {id}; use save to update it",
                meta.name
            )));
        }
        entity.audit_mut().stamp_created(created_by, now());
        let mut record = entity.to_record();
        entity.audit().write(&mut record);
        let insert = Insert {
            table: meta.table,
            values: record.iter().map(|(column, value)| (column, value.clone())).collect(),
        };
        let id = store.insert(&insert).await?;
        entity.audit_mut().id = Some(id);
        debug!(entity = meta.name, op = "create", id, "Entity created");
        Ok(entity)
    }

    /// Insert `entities` in order, stamping each with `created_by`.
    ///
    /// Every entity is checked for an existing id before the first insert.
    /// Inserts are not atomic as a group; wrap the call in a transaction to
    /// roll back earlier rows when a later one fails.
    pub async fn create_all<S: Store + ?Sized>(
        &self,
        store: &mut S,
        entities: Vec<F::Entity>,
        created_by: i64,
    ) -> AppResult<Vec<F::Entity>> {
        let meta = Self::meta();
        if let Some((index, id)) = entities
            .iter()
            .enumerate()
            .find_map(|(index, entity)| entity.id().map(|id| (index, id)))
        {
            return Err(AppError::validation(format!(
                "{} at position {index} already has id {id}; use save_all to update it",
                meta.name
            )));
        }

        let mut created = Vec::with_capacity(entities.len());
        for entity in entities {
            created.push(self.create(store, entity, created_by).await?);
        }
        debug!(entity = meta.name, op = "create_all", count = created.len(), "Entities created");
        Ok(created)
    }

    /// Save `entities` in order. Fails with `NotFound` at the first missing row.
    pub async fn save_all<S: Store + ?Sized>(
        &self,
        store: &mut S,
        entities: Vec<F::Entity>,
        updated_by: i64,
    ) -> AppResult<Vec<F::Entity>> {
        let mut saved = Vec::with_capacity(entities.len());
        for entity in entities {
            saved.push(self.save(store, entity, updated_by).await?);
        }
        debug!(entity = Self::meta().name, op = "save_all", count = saved.len(), "Entities saved");
        Ok(saved)
    }

    /// Write every entity column of an existing row and stamp the update.
    pub async fn save<S: Store + ?Sized>(
        &self,
        store: &mut S,
        mut entity: F::Entity,
        updated_by: i64,
    ) -> AppResult<F::Entity> {
        let meta = Self::meta();
        let id = entity
            .id()
            .ok_or_else(|| AppError::validation(format!("Cannot save an unsaved {}", meta.name)))?;
        let at = now();
        entity.audit_mut().stamp_updated(updated_by, at);

        let mut assignments: Vec<(&'static str, Value)> = entity
            .to_record()
            .iter()
            .map(|(column, value)| (column, value.clone()))
            .collect();
        assignments.push(("updated_by", Value::Int(updated_by)));
        assignments.push(("updated_date", Value::Timestamp(at)));

        let mut scope = Scope::new();
        let root = scope.bind(meta);
        let mutation = Mutation::Update(Update {
            filter: Predicate::eq(root.id(), id),
            table: root,
            assignments,
        });
        if store.execute(&mutation).await? == 0 {
            return Err(AppError::not_found(format!("{} with id {id} not found", meta.name)));
        }
        debug!(entity = meta.name, op = "save", id, "Entity saved");
        Ok(entity)
    }

    pub async fn update_by_id<S: Store + ?Sized>(
        &self,
        store: &mut S,
        spec: &UpdateSpec<F::Entity>,
        id: i64,
        updated_by: i64,
    ) -> AppResult<u64> {
        let assignments = stamped(spec, updated_by);
        self.execute_chunked(store, BulkOp::Update(&assignments), &[id])
            .await
    }

    /// Apply `spec` to every match, one statement per id chunk.
    ///
    /// Chunks run in order and are not atomic as a whole: if a later chunk
    /// fails, the error carries the progress of the chunks already applied.
    pub async fn update_by_criteria<S: Store + ?Sized>(
        &self,
        store: &mut S,
        spec: &UpdateSpec<F::Entity>,
        criteria: &Criteria<F>,
        updated_by: i64,
    ) -> AppResult<u64> {
        let ids = self.find_ids(store, criteria).await?;
        let assignments = stamped(spec, updated_by);
        self.execute_chunked(store, BulkOp::Update(&assignments), &ids)
            .await
    }

    pub async fn delete_by_id<S: Store + ?Sized>(&self, store: &mut S, id: i64) -> AppResult<bool> {
        Ok(self.execute_chunked(store, BulkOp::Delete, &[id]).await? > 0)
    }

    /// Delete every match, one statement per id chunk.
    pub async fn delete_by_criteria<S: Store + ?Sized>(
        &self,
        store: &mut S,
        criteria: &Criteria<F>,
    ) -> AppResult<u64> {
        let ids = self.find_ids(store, criteria).await?;
        self.execute_chunked(store, BulkOp::Delete, &ids).await
    }

    // ── Internals ────────────────────────────────────────────────────

    fn check_graph(&self, graph: &FetchGraph) -> AppResult<()> {
        let meta = Self::meta();
        if graph.root() != meta {
            return Err(AppError::configuration(format!(
                "Fetch graph for {} cannot be used with {}",
                graph.root().name,
                meta.name
            )));
        }
        Ok(())
    }

    async fn select_ids<S: Store + ?Sized>(
        &self,
        store: &mut S,
        criteria: &Criteria<F>,
        offset: Option<u64>,
        limit: Option<u64>,
    ) -> AppResult<Vec<i64>> {
        let mut scope = Scope::new();
        let root = scope.bind(Self::meta());
        let filter = criteria.predicate(&root, &mut scope);
        let order = order_terms(criteria.sort(), &root, &mut scope);
        let select = Select::ids(root)
            .filter(filter)
            .order_by(order)
            .window(offset, limit);
        fetch_ints(store, &select).await
    }

    /// Single-statement load with joins. Only safe for to-one graphs.
    async fn fetch_graph<S: Store + ?Sized>(
        &self,
        store: &mut S,
        criteria: &Criteria<F>,
        graph: &FetchGraph,
        offset: Option<u64>,
        limit: Option<u64>,
    ) -> AppResult<Vec<LoadedNode>> {
        let mut scope = Scope::new();
        let root = scope.bind(Self::meta());
        let filter = criteria.predicate(&root, &mut scope);
        let mut order = order_terms(criteria.sort(), &root, &mut scope);
        let plan = EntityPlan::build(&root, graph, &mut scope);
        order.extend(plan.child_order());
        let select = plan
            .select()
            .filter(filter)
            .order_by(order)
            .window(offset, limit);
        plan.fold(store.fetch(&select).await?)
    }

    /// Load `ids` with their graph, in the order given.
    async fn refetch<S: Store + ?Sized>(
        &self,
        store: &mut S,
        ids: &[i64],
        criteria: &Criteria<F>,
        graph: &FetchGraph,
    ) -> AppResult<Vec<LoadedNode>> {
        let ordering = store.capabilities().refetch_ordering;
        let chunk_size = match ordering {
            RefetchOrdering::ReapplySort => self.policy.bulk_chunk_size,
            RefetchOrdering::RankByPosition => self.policy.max_rank_ids,
        }
        .max(1);

        let mut nodes = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(chunk_size) {
            nodes.extend(self.refetch_chunk(store, chunk, criteria, graph, ordering).await?);
        }
        Ok(nodes)
    }

    async fn refetch_chunk<S: Store + ?Sized>(
        &self,
        store: &mut S,
        ids: &[i64],
        criteria: &Criteria<F>,
        graph: &FetchGraph,
        ordering: RefetchOrdering,
    ) -> AppResult<Vec<LoadedNode>> {
        let meta = Self::meta();
        let mut scope = Scope::new();
        let root = scope.bind(meta);
        let mut order = match ordering {
            RefetchOrdering::ReapplySort => order_terms(criteria.sort(), &root, &mut scope),
            RefetchOrdering::RankByPosition => vec![OrderTerm {
                expr: OrderExpr::Rank {
                    column: root.id(),
                    ids: ids.to_vec(),
                },
                direction: SortDirection::Asc,
            }],
        };
        let plan = EntityPlan::build(&root, graph, &mut scope);
        order.extend(plan.child_order());
        let select = plan
            .select()
            .filter(Some(Predicate::in_list(root.id(), ids.iter().copied())))
            .order_by(order);
        let nodes = plan.fold(store.fetch(&select).await?)?;

        if nodes.len() != ids.len() {
            error!(
                entity = meta.name,
                expected = ids.len(),
                fetched = nodes.len(),
                "Refetch returned a different number of roots than resolved ids"
            );
            return Err(AppError::internal(format!(
                "Refetching {} by id returned {} rows for {} ids",
                meta.name,
                nodes.len(),
                ids.len()
            )));
        }
        Ok(nodes)
    }

    async fn execute_chunked<S: Store + ?Sized>(
        &self,
        store: &mut S,
        op: BulkOp<'_>,
        ids: &[i64],
    ) -> AppResult<u64> {
        let meta = Self::meta();
        if ids.is_empty() {
            debug!(entity = meta.name, op = op.name(), "No rows matched");
            return Ok(0);
        }
        let chunk_size = self.policy.bulk_chunk_size.max(1);
        let total_chunks = ids.len().div_ceil(chunk_size);
        let mut affected = 0u64;

        for (index, chunk) in ids.chunks(chunk_size).enumerate() {
            let mut scope = Scope::new();
            let table = scope.bind(meta);
            let filter = Predicate::in_list(table.id(), chunk.iter().copied());
            let mutation = match &op {
                BulkOp::Update(assignments) => Mutation::Update(Update {
                    table,
                    assignments: assignments.to_vec(),
                    filter,
                }),
                BulkOp::Delete => Mutation::Delete(Delete { table, filter }),
            };

            match store.execute(&mutation).await {
                Ok(rows) => {
                    affected += rows;
                    debug!(
                        entity = meta.name,
                        op = op.name(),
                        chunk = index + 1,
                        total_chunks,
                        rows,
                        "Bulk chunk applied"
                    );
                }
                Err(source) if index > 0 => {
                    warn!(
                        entity = meta.name,
                        op = op.name(),
                        completed_chunks = index,
                        total_chunks,
                        affected_rows = affected,
                        error = %source,
                        "Bulk mutation failed part-way"
                    );
                    let progress = BulkProgress {
                        completed_chunks: index,
                        total_chunks,
                        affected_rows: affected,
                    };
                    return Err(AppError::partial_mutation(progress, source));
                }
                Err(source) => return Err(source),
            }
        }
        Ok(affected)
    }
}

fn stamped<E: Entity>(spec: &UpdateSpec<E>, updated_by: i64) -> Vec<(&'static str, Value)> {
    let mut assignments = spec.assignments().to_vec();
    assignments.push(("updated_by", Value::Int(updated_by)));
    assignments.push(("updated_date", Value::Timestamp(now())));
    assignments
}
