//! In-process store that evaluates the statement representation directly.
//!
//! Rows are kept per table in id order and returned in that order unless the
//! statement sorts them. NULLs sort last ascending and first descending, as
//! in PostgreSQL. Unique keys from the entity registry are enforced.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use tracing::trace;

use projectx_core::types::SortDirection;
use projectx_core::{AppError, AppResult};
use projectx_entity::{EntityMeta, Record, Value};

use super::{RefetchOrdering, Store, StoreCapabilities};
use crate::query::{
    CmpOp, ColumnRef, Insert, Join, JoinKind, Mutation, OrderExpr, OrderTerm, Predicate,
    Projection, Select, TableRef,
};

static NULL: Value = Value::Null;

/// One executed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalEntry {
    Select { table: &'static str, rows: usize },
    Insert { table: &'static str, id: i64 },
    Update { table: &'static str, rows: u64 },
    Delete { table: &'static str, rows: u64 },
}

#[derive(Debug, Clone)]
struct Table {
    meta: &'static EntityMeta,
    rows: BTreeMap<i64, Record>,
    next_id: i64,
}

/// Alias-to-row bindings visible while evaluating one candidate row.
type Env<'a> = Vec<(&'a str, Option<&'a Record>)>;

#[derive(Debug, Clone)]
pub struct MemoryStore {
    tables: HashMap<&'static str, Table>,
    refetch_ordering: RefetchOrdering,
    journal: Vec<JournalEntry>,
    mutations_before_failure: Option<usize>,
}

impl MemoryStore {
    /// Create empty tables for every entity in `schema`.
    pub fn new(schema: &[&'static EntityMeta]) -> Self {
        let tables = schema
            .iter()
            .map(|&meta| {
                (
                    meta.table,
                    Table {
                        meta,
                        rows: BTreeMap::new(),
                        next_id: 1,
                    },
                )
            })
            .collect();
        Self {
            tables,
            refetch_ordering: RefetchOrdering::RankByPosition,
            journal: Vec::new(),
            mutations_before_failure: None,
        }
    }

    /// Override the refetch ordering this store declares.
    pub fn with_refetch_ordering(mut self, ordering: RefetchOrdering) -> Self {
        self.refetch_ordering = ordering;
        self
    }

    /// Statements executed so far.
    pub fn journal(&self) -> &[JournalEntry] {
        &self.journal
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    /// Make every update/delete after the next `count` fail.
    pub fn fail_after_mutations(&mut self, count: usize) {
        self.mutations_before_failure = Some(count);
    }

    /// Number of rows currently stored in `table`.
    pub fn row_count(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, |t| t.rows.len())
    }

    fn table(&self, name: &str) -> AppResult<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| AppError::database(format!("relation \"{name}\" does not exist")))
    }

    fn table_mut(&mut self, name: &str) -> AppResult<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| AppError::database(format!("relation \"{name}\" does not exist")))
    }

    fn run_select<'a>(&'a self, select: &'a Select) -> AppResult<Vec<Vec<Value>>> {
        let mut envs = Vec::new();
        for env in self.scan(&select.from, &select.joins, &Vec::new())? {
            let keep = match &select.filter {
                Some(filter) => self.test(filter, &env)?,
                None => true,
            };
            if keep {
                envs.push(env);
            }
        }

        if !select.order_by.is_empty() {
            let mut keyed = envs
                .into_iter()
                .map(|env| -> AppResult<_> { Ok((self.sort_keys(&select.order_by, &env)?, env)) })
                .collect::<AppResult<Vec<_>>>()?;
            keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b, &select.order_by));
            envs = keyed.into_iter().map(|(_, env)| env).collect();
        }

        let rows = match &select.projection {
            Projection::Count => return Ok(vec![vec![Value::Int(envs.len() as i64)]]),
            Projection::CountDistinct(column) => {
                let mut seen = HashSet::new();
                for env in &envs {
                    let value = lookup(env, column)?;
                    if !value.is_null() {
                        seen.insert(value.clone());
                    }
                }
                return Ok(vec![vec![Value::Int(seen.len() as i64)]]);
            }
            Projection::Columns(columns) => {
                let mut rows = Vec::with_capacity(envs.len());
                let mut seen = HashSet::new();
                for env in &envs {
                    let row = columns
                        .iter()
                        .map(|c| lookup(env, &c.column).cloned())
                        .collect::<AppResult<Vec<_>>>()?;
                    if !select.distinct || seen.insert(row.clone()) {
                        rows.push(row);
                    }
                }
                rows
            }
        };

        let offset = select.offset.map_or(0, |o| o as usize);
        let limit = select.limit.map_or(usize::MAX, |l| l as usize);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    /// Rows of `from` combined with each join, extending `outer` bindings.
    fn scan<'a>(
        &'a self,
        from: &'a TableRef,
        joins: &'a [Join],
        outer: &Env<'a>,
    ) -> AppResult<Vec<Env<'a>>> {
        let table = self.table(from.table)?;
        let mut envs: Vec<Env<'a>> = table
            .rows
            .values()
            .map(|row| {
                let mut env = outer.clone();
                env.push((from.alias.as_str(), Some(row)));
                env
            })
            .collect();

        for join in joins {
            let joined = self.table(join.table.table)?;
            let mut expanded = Vec::new();
            for env in envs {
                let mut matched = false;
                for row in joined.rows.values() {
                    let mut candidate = env.clone();
                    candidate.push((join.table.alias.as_str(), Some(row)));
                    if self.test(&join.on, &candidate)? {
                        expanded.push(candidate);
                        matched = true;
                    }
                }
                if !matched && join.kind == JoinKind::Left {
                    let mut env = env;
                    env.push((join.table.alias.as_str(), None));
                    expanded.push(env);
                }
            }
            envs = expanded;
        }
        Ok(envs)
    }

    fn test<'a>(&'a self, predicate: &'a Predicate, env: &Env<'a>) -> AppResult<bool> {
        Ok(match predicate {
            Predicate::Compare { column, op, value } => {
                compare(lookup(env, column)?, value).is_some_and(|ord| matches_op(*op, ord))
            }
            Predicate::ColumnsEqual(left, right) => {
                compare(lookup(env, left)?, lookup(env, right)?) == Some(Ordering::Equal)
            }
            Predicate::InList {
                column,
                values,
                negated,
            } => {
                let value = lookup(env, column)?;
                if value.is_null() {
                    false
                } else {
                    let found = values
                        .iter()
                        .any(|v| compare(value, v) == Some(Ordering::Equal));
                    found != *negated
                }
            }
            Predicate::Contains { column, needle } => lookup(env, column)?
                .as_text()
                .is_some_and(|text| text.to_lowercase().contains(&needle.to_lowercase())),
            Predicate::And(parts) => {
                for part in parts {
                    if !self.test(part, env)? {
                        return Ok(false);
                    }
                }
                true
            }
            Predicate::Or(parts) => {
                for part in parts {
                    if self.test(part, env)? {
                        return Ok(true);
                    }
                }
                false
            }
            Predicate::Exists(sub) => {
                for inner in self.scan(&sub.from, &sub.joins, env)? {
                    if self.test(&sub.filter, &inner)? {
                        return Ok(true);
                    }
                }
                false
            }
        })
    }

    fn sort_keys<'a>(&'a self, terms: &'a [OrderTerm], env: &Env<'a>) -> AppResult<Vec<Value>> {
        terms
            .iter()
            .map(|term| match &term.expr {
                OrderExpr::Column(column) => lookup(env, column).cloned(),
                OrderExpr::Related {
                    target,
                    key,
                    foreign_key,
                    column,
                } => {
                    let fk = lookup(env, foreign_key)?;
                    let related = self
                        .table(target.table)?
                        .rows
                        .values()
                        .find(|row| compare(row.get(key), fk) == Some(Ordering::Equal));
                    Ok(related.map_or(Value::Null, |row| row.get(column).clone()))
                }
                OrderExpr::Rank { column, ids } => {
                    let id = lookup(env, column)?.as_int();
                    let position = ids
                        .iter()
                        .position(|candidate| Some(*candidate) == id)
                        .unwrap_or(ids.len());
                    Ok(Value::Int(position as i64))
                }
            })
            .collect()
    }

    /// Ids of `table` rows matching `filter`.
    fn matching_ids(&self, table: &TableRef, filter: &Predicate) -> AppResult<Vec<i64>> {
        let mut ids = Vec::new();
        for env in self.scan(table, &[], &Vec::new())? {
            if self.test(filter, &env)? {
                if let Some(id) = env.last().and_then(|(_, row)| row.and_then(Record::id)) {
                    ids.push(id);
                }
            }
        }
        Ok(ids)
    }

    fn check_failure_injection(&mut self) -> AppResult<()> {
        if let Some(remaining) = self.mutations_before_failure.as_mut() {
            if *remaining == 0 {
                return Err(AppError::database("Injected store failure"));
            }
            *remaining -= 1;
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities {
            backend: "memory",
            refetch_ordering: self.refetch_ordering,
        }
    }

    async fn fetch(&mut self, select: &Select) -> AppResult<Vec<Vec<Value>>> {
        let rows = self.run_select(select)?;
        trace!(table = select.from.table, rows = rows.len(), "memory fetch");
        self.journal.push(JournalEntry::Select {
            table: select.from.table,
            rows: rows.len(),
        });
        Ok(rows)
    }

    async fn execute(&mut self, mutation: &Mutation) -> AppResult<u64> {
        self.check_failure_injection()?;
        match mutation {
            Mutation::Update(update) => {
                let ids = self.matching_ids(&update.table, &update.filter)?;
                let table = self.table_mut(update.table.table)?;
                let mut staged = table.rows.clone();
                for id in &ids {
                    if let Some(row) = staged.get_mut(id) {
                        for (column, value) in &update.assignments {
                            row.set(*column, value.clone());
                        }
                    }
                }
                for id in &ids {
                    if let Some(key) = staged.get(id).and_then(|row| violated_key(table.meta, &staged, *id, row)) {
                        return Err(AppError::conflict(format!(
                            "Constraint '{key}' violated on {}",
                            table.meta.table
                        )));
                    }
                }
                table.rows = staged;
                let rows = ids.len() as u64;
                self.journal.push(JournalEntry::Update {
                    table: update.table.table,
                    rows,
                });
                Ok(rows)
            }
            Mutation::Delete(delete) => {
                let ids = self.matching_ids(&delete.table, &delete.filter)?;
                let table = self.table_mut(delete.table.table)?;
                for id in &ids {
                    table.rows.remove(id);
                }
                let rows = ids.len() as u64;
                self.journal.push(JournalEntry::Delete {
                    table: delete.table.table,
                    rows,
                });
                Ok(rows)
            }
        }
    }

    async fn insert(&mut self, insert: &Insert) -> AppResult<i64> {
        let table = self.table_mut(insert.table)?;
        let id = table.next_id;
        let mut row = Record::new().with(EntityMeta::ID, id);
        for (column, value) in &insert.values {
            row.set(*column, value.clone());
        }
        if let Some(key) = violated_key(table.meta, &table.rows, id, &row) {
            return Err(AppError::conflict(format!(
                "Constraint '{key}' violated on {}",
                table.meta.table
            )));
        }
        table.next_id += 1;
        table.rows.insert(id, row);
        self.journal.push(JournalEntry::Insert {
            table: insert.table,
            id,
        });
        Ok(id)
    }
}

fn lookup<'a>(env: &Env<'a>, column: &ColumnRef) -> AppResult<&'a Value> {
    match env.iter().rev().find(|(alias, _)| *alias == column.alias) {
        Some((_, Some(row))) => Ok(row.get(column.column)),
        Some((_, None)) => Ok(&NULL),
        None => Err(AppError::database(format!(
            "missing FROM-clause entry for table \"{}\"",
            column.alias
        ))),
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn matches_op(op: CmpOp, ord: Ordering) -> bool {
    match op {
        CmpOp::Eq => ord == Ordering::Equal,
        CmpOp::Ne => ord != Ordering::Equal,
        CmpOp::Gt => ord == Ordering::Greater,
        CmpOp::Gte => ord != Ordering::Less,
        CmpOp::Lt => ord == Ordering::Less,
        CmpOp::Lte => ord != Ordering::Greater,
    }
}

fn compare_keys(left: &[Value], right: &[Value], terms: &[OrderTerm]) -> Ordering {
    for ((a, b), term) in left.iter().zip(right).zip(terms) {
        let ord = match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => compare(a, b).unwrap_or(Ordering::Equal),
        };
        let ord = match term.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// The first unique key `row` would share with another row. NULLs never collide.
fn violated_key(
    meta: &EntityMeta,
    rows: &BTreeMap<i64, Record>,
    id: i64,
    row: &Record,
) -> Option<&'static str> {
    meta.unique_keys
        .iter()
        .find(|key| {
            key.columns.iter().all(|c| !row.get(c).is_null())
                && rows.iter().any(|(other_id, other)| {
                    *other_id != id && key.columns.iter().all(|c| other.get(c) == row.get(c))
                })
        })
        .map(|key| key.name)
}

#[cfg(test)]
mod tests {
    use projectx_entity::SCHEMA;
    use projectx_entity::role::model::ROLE;

    use super::*;
    use crate::query::{Scope, Selected};

    fn role_insert(app: &str, name: &str, description: Option<&str>) -> Insert {
        Insert {
            table: "mjr_role",
            values: vec![
                ("app_name", Value::from(app)),
                ("name", Value::from(name)),
                ("type", Value::from("CUSTOM")),
                ("description", Value::from(description)),
            ],
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids_and_enforces_unique_keys() {
        let mut store = MemoryStore::new(SCHEMA);
        assert_eq!(store.insert(&role_insert("admin", "a", None)).await.unwrap(), 1);
        assert_eq!(store.insert(&role_insert("admin", "b", None)).await.unwrap(), 2);

        let err = store.insert(&role_insert("admin", "a", None)).await.unwrap_err();
        assert_eq!(err.kind, projectx_core::ErrorKind::Conflict);
        assert!(err.message.contains("uq_mjr_role_app_name"));
        assert_eq!(store.row_count("mjr_role"), 2);
    }

    #[tokio::test]
    async fn test_nulls_sort_last_ascending_and_first_descending() {
        let mut store = MemoryStore::new(SCHEMA);
        store.insert(&role_insert("admin", "a", Some("beta"))).await.unwrap();
        store.insert(&role_insert("admin", "b", None)).await.unwrap();
        store.insert(&role_insert("admin", "c", Some("alpha"))).await.unwrap();

        let mut scope = Scope::new();
        let root = scope.bind(&ROLE);
        let ordered = |direction| {
            Select::ids(root.clone()).order_by(vec![OrderTerm::column(root.col("description"), direction)])
        };

        let asc = store.fetch(&ordered(SortDirection::Asc)).await.unwrap();
        assert_eq!(asc, vec![vec![Value::Int(3)], vec![Value::Int(1)], vec![Value::Int(2)]]);
        let desc = store.fetch(&ordered(SortDirection::Desc)).await.unwrap();
        assert_eq!(desc, vec![vec![Value::Int(2)], vec![Value::Int(1)], vec![Value::Int(3)]]);
    }

    #[tokio::test]
    async fn test_distinct_projection_and_window() {
        let mut store = MemoryStore::new(SCHEMA);
        for name in ["a", "b", "c"] {
            store.insert(&role_insert("portal", name, None)).await.unwrap();
        }
        store.insert(&role_insert("admin", "a", None)).await.unwrap();

        let mut scope = Scope::new();
        let root = scope.bind(&ROLE);
        let app = root.col("app_name");
        let select = Select::new(
            root.clone(),
            Projection::Columns(vec![Selected {
                column: app.clone(),
                kind: projectx_entity::ValueKind::Text,
            }]),
        )
        .distinct()
        .order_by(vec![OrderTerm::column(app, SortDirection::Asc)]);

        let rows = store.fetch(&select).await.unwrap();
        assert_eq!(rows, vec![vec![Value::from("admin")], vec![Value::from("portal")]]);

        let windowed = store.fetch(&select.window(Some(1), Some(5))).await.unwrap();
        assert_eq!(windowed, vec![vec![Value::from("portal")]]);
    }

    #[tokio::test]
    async fn test_injected_failure_leaves_rows_untouched() {
        let mut store = MemoryStore::new(SCHEMA);
        store.insert(&role_insert("admin", "a", None)).await.unwrap();
        store.fail_after_mutations(0);

        let mut scope = Scope::new();
        let root = scope.bind(&ROLE);
        let delete = Mutation::Delete(crate::query::Delete {
            filter: Predicate::eq(root.id(), 1_i64),
            table: root,
        });
        assert!(store.execute(&delete).await.is_err());
        assert_eq!(store.row_count("mjr_role"), 1);
    }
}
