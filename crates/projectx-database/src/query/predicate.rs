//! Boolean predicates over aliased tables.

use projectx_entity::{EntityMeta, Value};

/// A table bound to an alias within one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub table: &'static str,
    pub alias: String,
}

impl TableRef {
    /// Reference a column of this table.
    pub fn col(&self, column: &'static str) -> ColumnRef {
        ColumnRef {
            alias: self.alias.clone(),
            column,
        }
    }

    /// The primary key column of this table.
    pub fn id(&self) -> ColumnRef {
        self.col(EntityMeta::ID)
    }
}

/// An alias-qualified column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub alias: String,
    pub column: &'static str,
}

/// Hands out statement-unique table aliases (`t0`, `t1`, ...).
#[derive(Debug, Default)]
pub struct Scope {
    next: usize,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a fresh alias to an entity's table.
    pub fn bind(&mut self, meta: &EntityMeta) -> TableRef {
        let alias = format!("t{}", self.next);
        self.next += 1;
        TableRef {
            table: meta.table,
            alias,
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CmpOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

/// A joined table and its join condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: TableRef,
    pub on: Predicate,
}

/// Body of an `EXISTS (SELECT 1 ...)` sub-select.
#[derive(Debug, Clone, PartialEq)]
pub struct SubQuery {
    pub from: TableRef,
    pub joins: Vec<Join>,
    pub filter: Predicate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        column: ColumnRef,
        op: CmpOp,
        value: Value,
    },
    ColumnsEqual(ColumnRef, ColumnRef),
    InList {
        column: ColumnRef,
        values: Vec<Value>,
        negated: bool,
    },
    /// Case-insensitive substring match; the needle is matched literally.
    Contains {
        column: ColumnRef,
        needle: String,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Exists(Box<SubQuery>),
}

impl Predicate {
    pub fn compare(column: ColumnRef, op: CmpOp, value: impl Into<Value>) -> Self {
        Self::Compare {
            column,
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: ColumnRef, value: impl Into<Value>) -> Self {
        Self::compare(column, CmpOp::Eq, value)
    }

    pub fn in_list<V: Into<Value>>(column: ColumnRef, values: impl IntoIterator<Item = V>) -> Self {
        Self::InList {
            column,
            values: values.into_iter().map(Into::into).collect(),
            negated: false,
        }
    }

    pub fn not_in<V: Into<Value>>(column: ColumnRef, values: impl IntoIterator<Item = V>) -> Self {
        Self::InList {
            column,
            values: values.into_iter().map(Into::into).collect(),
            negated: true,
        }
    }

    pub fn contains(column: ColumnRef, needle: impl Into<String>) -> Self {
        Self::Contains {
            column,
            needle: needle.into(),
        }
    }

    pub fn exists(from: TableRef, joins: Vec<Join>, filter: Predicate) -> Self {
        Self::Exists(Box::new(SubQuery {
            from,
            joins,
            filter,
        }))
    }
}

/// Accumulates predicates that must all hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conjunction {
    clauses: Vec<Predicate>,
}

impl Conjunction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(&mut self, predicate: Predicate) {
        self.clauses.push(predicate);
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Collapse into one predicate, or `None` when nothing was added.
    pub fn into_predicate(mut self) -> Option<Predicate> {
        match self.clauses.len() {
            0 => None,
            1 => self.clauses.pop(),
            _ => Some(Predicate::And(self.clauses)),
        }
    }
}
