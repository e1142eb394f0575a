//! Criteria shared by every entity.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDateTime;

use projectx_core::AppResult;
use projectx_core::types::SortDirection;
use projectx_entity::{Entity, EntityMeta, Value};

use super::paging::Paging;
use super::sort::{ResolvedSort, SortKeys};
use crate::query::{CmpOp, Conjunction, Predicate, Scope, TableRef};

/// Entity-specific filter fields.
pub trait Filter: fmt::Debug + Clone + Default + Send + Sync + 'static {
    type Entity: Entity;

    /// Add this filter's predicates for the table bound to `root`.
    fn apply(&self, root: &TableRef, scope: &mut Scope, conjunction: &mut Conjunction);
}

/// Filters over the audit columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    pub id: Option<i64>,
    /// Only ids strictly greater than this.
    pub from_id: Option<i64>,
    pub include_ids: BTreeSet<i64>,
    pub exclude_ids: BTreeSet<i64>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_date_from: Option<NaiveDateTime>,
    pub created_date_to: Option<NaiveDateTime>,
    pub updated_date_from: Option<NaiveDateTime>,
    pub updated_date_to: Option<NaiveDateTime>,
}

impl AuditFilter {
    fn apply(&self, root: &TableRef, conjunction: &mut Conjunction) {
        if let Some(id) = self.id {
            conjunction.and(Predicate::eq(root.id(), id));
        }
        if let Some(from_id) = self.from_id {
            conjunction.and(Predicate::compare(root.id(), CmpOp::Gt, from_id));
        }
        if !self.include_ids.is_empty() {
            conjunction.and(Predicate::in_list(root.id(), self.include_ids.iter().copied()));
        }
        if !self.exclude_ids.is_empty() {
            conjunction.and(Predicate::not_in(root.id(), self.exclude_ids.iter().copied()));
        }
        if let Some(by) = self.created_by {
            conjunction.and(Predicate::eq(root.col("created_by"), by));
        }
        if let Some(by) = self.updated_by {
            conjunction.and(Predicate::eq(root.col("updated_by"), by));
        }
        date_range(
            conjunction,
            root,
            "created_date",
            self.created_date_from,
            self.created_date_to,
        );
        date_range(
            conjunction,
            root,
            "updated_date",
            self.updated_date_from,
            self.updated_date_to,
        );
    }
}

/// Inclusive bounds on a timestamp column.
pub(crate) fn date_range(
    conjunction: &mut Conjunction,
    root: &TableRef,
    column: &'static str,
    from: Option<NaiveDateTime>,
    to: Option<NaiveDateTime>,
) {
    if let Some(from) = from {
        conjunction.and(Predicate::compare(root.col(column), CmpOp::Gte, from));
    }
    if let Some(to) = to {
        conjunction.and(Predicate::compare(root.col(column), CmpOp::Lte, to));
    }
}

/// Exact match on a text column; blank values are ignored.
pub(crate) fn text_eq(
    conjunction: &mut Conjunction,
    root: &TableRef,
    column: &'static str,
    value: &Option<String>,
) {
    if let Some(value) = non_blank(value) {
        conjunction.and(Predicate::eq(root.col(column), value));
    }
}

/// Exact match on an optional column value.
pub(crate) fn value_eq<V: Into<Value> + Clone>(
    conjunction: &mut Conjunction,
    root: &TableRef,
    column: &'static str,
    value: &Option<V>,
) {
    if let Some(value) = value {
        conjunction.and(Predicate::eq(root.col(column), value.clone()));
    }
}

/// The value if it holds anything besides whitespace.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// A frozen, validated query description for one entity type.
///
/// Built through [`CriteriaBuilder`]; sort keys are already resolved, so a
/// criteria value can always be compiled.
#[derive(Debug, Clone)]
pub struct Criteria<F: Filter> {
    audit: AuditFilter,
    keyword: Option<String>,
    sort: Vec<ResolvedSort>,
    paging: Paging,
    filter: F,
}

impl<F: Filter> Default for Criteria<F> {
    fn default() -> Self {
        Self {
            audit: AuditFilter::default(),
            keyword: None,
            sort: Vec::new(),
            paging: Paging::default(),
            filter: F::default(),
        }
    }
}

impl<F: Filter> Criteria<F> {
    pub fn builder() -> CriteriaBuilder<F> {
        CriteriaBuilder::default()
    }

    /// Metadata of the entity this criteria selects.
    pub fn meta() -> &'static EntityMeta {
        F::Entity::meta()
    }

    pub fn audit(&self) -> &AuditFilter {
        &self.audit
    }

    pub fn keyword(&self) -> Option<&str> {
        non_blank(&self.keyword)
    }

    pub fn sort(&self) -> &[ResolvedSort] {
        &self.sort
    }

    pub fn paging(&self) -> Paging {
        self.paging
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    /// Every predicate this criteria contributes for `root`.
    pub fn conjunction(&self, root: &TableRef, scope: &mut Scope) -> Conjunction {
        let mut conjunction = Conjunction::new();
        self.audit.apply(root, &mut conjunction);
        if let Some(keyword) = self.keyword() {
            let columns = Self::meta().keyword_columns;
            if !columns.is_empty() {
                conjunction.and(Predicate::Or(
                    columns
                        .iter()
                        .map(|&column| Predicate::contains(root.col(column), keyword))
                        .collect(),
                ));
            }
        }
        self.filter.apply(root, scope, &mut conjunction);
        conjunction
    }

    /// The combined predicate, or `None` when nothing constrains the query.
    pub fn predicate(&self, root: &TableRef, scope: &mut Scope) -> Option<Predicate> {
        self.conjunction(root, scope).into_predicate()
    }
}

/// Builder for [`Criteria`]. Entity-specific setters live next to each filter.
#[derive(Debug, Clone, Default)]
pub struct CriteriaBuilder<F: Filter> {
    audit: AuditFilter,
    keyword: Option<String>,
    sort: SortKeys,
    paging: Paging,
    pub(crate) filter: F,
}

impl<F: Filter> CriteriaBuilder<F> {
    pub fn id(mut self, id: i64) -> Self {
        self.audit.id = Some(id);
        self
    }

    pub fn from_id(mut self, id: i64) -> Self {
        self.audit.from_id = Some(id);
        self
    }

    pub fn include_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.audit.include_ids.extend(ids);
        self
    }

    pub fn exclude_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.audit.exclude_ids.extend(ids);
        self
    }

    pub fn created_by(mut self, by: i64) -> Self {
        self.audit.created_by = Some(by);
        self
    }

    pub fn updated_by(mut self, by: i64) -> Self {
        self.audit.updated_by = Some(by);
        self
    }

    pub fn created_between(mut self, from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> Self {
        self.audit.created_date_from = from;
        self.audit.created_date_to = to;
        self
    }

    pub fn updated_between(mut self, from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> Self {
        self.audit.updated_date_from = from;
        self.audit.updated_date_to = to;
        self
    }

    /// Case-insensitive substring search over the entity's keyword columns.
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Add a sort key, e.g. `name` or `administrator.name`.
    pub fn sort(mut self, key: impl Into<String>, direction: SortDirection) -> Self {
        self.sort.insert(key, direction);
        self
    }

    /// Request a 1-based page.
    pub fn page(mut self, page_number: u32) -> Self {
        self.paging.page_number = Some(page_number);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.paging.offset = Some(offset);
        self
    }

    /// Page size for paged queries. Has no effect on unpaged queries.
    pub fn limit(mut self, limit: u32) -> Self {
        self.paging.limit = Some(limit);
        self
    }

    /// Resolve sort keys and freeze the criteria.
    pub fn build(self) -> AppResult<Criteria<F>> {
        let sort = self.sort.resolve(F::Entity::meta())?;
        Ok(Criteria {
            audit: self.audit,
            keyword: self.keyword,
            sort,
            paging: self.paging,
            filter: self.filter,
        })
    }
}
