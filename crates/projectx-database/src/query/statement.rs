//! Statements understood by every store adapter.

use projectx_core::types::SortDirection;
use projectx_entity::{EntityMeta, Value, ValueKind};

use super::predicate::{ColumnRef, Join, Predicate, TableRef};

/// A projected column and the type it decodes to.
#[derive(Debug, Clone, PartialEq)]
pub struct Selected {
    pub column: ColumnRef,
    pub kind: ValueKind,
}

impl Selected {
    /// Every column of an entity, audit columns first.
    pub fn entity(table: &TableRef, meta: &EntityMeta) -> Vec<Selected> {
        meta.all_columns()
            .map(|c| Selected {
                column: table.col(c.name),
                kind: c.kind,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Columns(Vec<Selected>),
    /// `COUNT(*)`.
    Count,
    /// `COUNT(DISTINCT column)`.
    CountDistinct(ColumnRef),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderExpr {
    Column(ColumnRef),
    /// A column of a to-one related row, read through a correlated scalar
    /// sub-select so the outer row count is unaffected.
    Related {
        target: TableRef,
        key: &'static str,
        foreign_key: ColumnRef,
        column: &'static str,
    },
    /// Position of `column` within `ids`; absent values rank last.
    Rank { column: ColumnRef, ids: Vec<i64> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderTerm {
    pub expr: OrderExpr,
    pub direction: SortDirection,
}

impl OrderTerm {
    pub fn column(column: ColumnRef, direction: SortDirection) -> Self {
        Self {
            expr: OrderExpr::Column(column),
            direction,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub from: TableRef,
    pub joins: Vec<Join>,
    pub projection: Projection,
    pub distinct: bool,
    pub filter: Option<Predicate>,
    pub order_by: Vec<OrderTerm>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Select {
    pub fn new(from: TableRef, projection: Projection) -> Self {
        Self {
            from,
            joins: Vec::new(),
            projection,
            distinct: false,
            filter: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Project only the root id.
    pub fn ids(from: TableRef) -> Self {
        let column = from.id();
        Self::new(
            from,
            Projection::Columns(vec![Selected {
                column,
                kind: ValueKind::Int,
            }]),
        )
    }

    pub fn joins(mut self, joins: Vec<Join>) -> Self {
        self.joins = joins;
        self
    }

    pub fn filter(mut self, filter: Option<Predicate>) -> Self {
        self.filter = filter;
        self
    }

    pub fn order_by(mut self, terms: Vec<OrderTerm>) -> Self {
        self.order_by = terms;
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn window(mut self, offset: Option<u64>, limit: Option<u64>) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: TableRef,
    pub assignments: Vec<(&'static str, Value)>,
    pub filter: Predicate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: TableRef,
    pub filter: Predicate,
}

/// A statement that reports an affected-row count.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Update(Update),
    Delete(Delete),
}

impl Mutation {
    pub fn table(&self) -> &'static str {
        match self {
            Self::Update(update) => update.table.table,
            Self::Delete(delete) => delete.table.table,
        }
    }
}

/// A single-row insert returning the generated id.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: &'static str,
    pub values: Vec<(&'static str, Value)>,
}
