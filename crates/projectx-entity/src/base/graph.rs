//! Row trees produced by fetching an entity together with its relations.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use super::record::Record;

/// One fetched record plus the related records loaded with it.
///
/// Children are keyed by id in first-seen order, so folding a joined result
/// set that repeats a parent once per child keeps each child once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedNode {
    pub record: Record,
    pub relations: BTreeMap<&'static str, IndexMap<i64, LoadedNode>>,
}

impl LoadedNode {
    pub fn new(record: Record) -> Self {
        Self {
            record,
            relations: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.record.id()
    }

    /// The fetched children of a relation, or `None` if it was not fetched.
    pub fn children(&self, relation: &str) -> Option<impl Iterator<Item = &LoadedNode>> {
        self.relations.get(relation).map(|children| children.values())
    }
}
