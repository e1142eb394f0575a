//! Projection and row folding for a root entity plus its fetch graph.

use indexmap::IndexMap;

use projectx_core::types::SortDirection;
use projectx_core::{AppError, AppResult};
use projectx_entity::{EntityMeta, LoadedNode, Record, RelationDef, Value};

use crate::fetch::{FetchGraph, FetchNode};
use crate::query::{Join, JoinKind, OrderTerm, Predicate, Projection, Scope, Select, Selected, TableRef};

struct PlanNode {
    table: TableRef,
    meta: &'static EntityMeta,
    relation: Option<&'static RelationDef>,
    parent: Option<usize>,
    start: usize,
}

/// Columns and joins that load a root entity with its graph in one select,
/// and the inverse operation that folds the joined rows back into trees.
pub(crate) struct EntityPlan {
    root: TableRef,
    joins: Vec<Join>,
    columns: Vec<Selected>,
    nodes: Vec<PlanNode>,
}

impl EntityPlan {
    pub(crate) fn build(root: &TableRef, graph: &FetchGraph, scope: &mut Scope) -> Self {
        let mut plan = Self {
            root: root.clone(),
            joins: Vec::new(),
            columns: Vec::new(),
            nodes: Vec::new(),
        };
        plan.push(root.clone(), graph.root(), None, None);
        plan.expand(0, graph.nodes(), scope);
        plan
    }

    fn push(
        &mut self,
        table: TableRef,
        meta: &'static EntityMeta,
        relation: Option<&'static RelationDef>,
        parent: Option<usize>,
    ) -> usize {
        let start = self.columns.len();
        self.columns.extend(Selected::entity(&table, meta));
        self.nodes.push(PlanNode {
            table,
            meta,
            relation,
            parent,
            start,
        });
        self.nodes.len() - 1
    }

    fn expand(&mut self, parent: usize, children: &[FetchNode], scope: &mut Scope) {
        for child in children {
            let relation = child.relation;
            let table = scope.bind(relation.target);
            let owner = &self.nodes[parent].table;
            self.joins.push(Join {
                kind: JoinKind::Left,
                on: Predicate::ColumnsEqual(
                    table.col(relation.remote_column),
                    owner.col(relation.local_column),
                ),
                table: table.clone(),
            });
            let index = self.push(table, relation.target, Some(relation), Some(parent));
            self.expand(index, &child.children, scope);
        }
    }

    /// A select over every planned column with the planned joins.
    pub(crate) fn select(&self) -> Select {
        Select::new(self.root.clone(), Projection::Columns(self.columns.clone()))
            .joins(self.joins.clone())
    }

    /// Id ascending for every joined table, so children come back in id order.
    pub(crate) fn child_order(&self) -> Vec<OrderTerm> {
        self.nodes
            .iter()
            .skip(1)
            .map(|node| OrderTerm::column(node.table.id(), SortDirection::Asc))
            .collect()
    }

    /// Fold joined rows into one tree per root, in first-seen order.
    pub(crate) fn fold(&self, rows: Vec<Vec<Value>>) -> AppResult<Vec<LoadedNode>> {
        let mut roots: IndexMap<i64, LoadedNode> = IndexMap::new();
        for row in rows {
            let mut records = Vec::with_capacity(self.nodes.len());
            for node in &self.nodes {
                records.push(self.decode(node, &row)?);
            }
            let ids: Vec<Option<i64>> = records.iter().map(Record::id).collect();
            let root_id = ids[0].ok_or_else(|| AppError::internal("Fetched a row without a root id"))?;
            let root = roots
                .entry(root_id)
                .or_insert_with(|| LoadedNode::new(records[0].clone()));

            for index in 1..self.nodes.len() {
                let path: Option<Vec<(&'static str, i64)>> = self
                    .ancestors(index)
                    .into_iter()
                    .map(|step| ids[step].map(|id| (self.relation_name(step), id)))
                    .collect();
                // A NULL ancestor means the whole branch is absent in this row.
                let Some(path) = path else {
                    continue;
                };
                let Some(parent) = descend(root, &path) else {
                    continue;
                };
                let children = parent.relations.entry(self.relation_name(index)).or_default();
                if let Some(id) = ids[index] {
                    children
                        .entry(id)
                        .or_insert_with(|| LoadedNode::new(records[index].clone()));
                }
            }
        }
        Ok(roots.into_values().collect())
    }

    fn decode(&self, node: &PlanNode, row: &[Value]) -> AppResult<Record> {
        let values = row
            .get(node.start..node.start + node.meta.column_count())
            .ok_or_else(|| AppError::internal(format!("Row too short for {}", node.meta.name)))?;
        let mut record = Record::new();
        for (column, value) in node.meta.all_columns().zip(values) {
            record.set(column.name, value.clone());
        }
        Ok(record)
    }

    /// Joined ancestors of `index`, outermost first, excluding the root.
    fn ancestors(&self, index: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut cursor = self.nodes[index].parent;
        while let Some(parent) = cursor {
            if parent == 0 {
                break;
            }
            chain.push(parent);
            cursor = self.nodes[parent].parent;
        }
        chain.reverse();
        chain
    }

    fn relation_name(&self, index: usize) -> &'static str {
        self.nodes[index].relation.map_or("", |relation| relation.name)
    }
}

fn descend<'a>(node: &'a mut LoadedNode, path: &[(&'static str, i64)]) -> Option<&'a mut LoadedNode> {
    match path.split_first() {
        None => Some(node),
        Some(((relation, id), rest)) => descend(node.relations.get_mut(relation)?.get_mut(id)?, rest),
    }
}
