//! The trait every persisted entity implements.

use projectx_core::{AppError, AppResult};

use super::audit::AuditFields;
use super::graph::LoadedNode;
use super::meta::EntityMeta;
use super::record::Record;

/// A persisted entity backed by one table.
pub trait Entity: std::fmt::Debug + Clone + Send + Sync + Sized + 'static {
    /// Table and relation metadata.
    fn meta() -> &'static EntityMeta;

    fn audit(&self) -> &AuditFields;

    fn audit_mut(&mut self) -> &mut AuditFields;

    /// Decode scalar columns. Relations stay unloaded.
    fn from_record(record: &Record) -> AppResult<Self>;

    /// Encode the entity columns, excluding the audit columns.
    fn to_record(&self) -> Record;

    /// Populate a fetched relation.
    fn attach(&mut self, relation: &str, _children: Vec<&LoadedNode>) -> AppResult<()> {
        Err(AppError::invalid_field(
            Self::meta().name,
            relation,
            format!("{} has no relation '{relation}'", Self::meta().name),
        ))
    }

    fn id(&self) -> Option<i64> {
        self.audit().id
    }
}

/// Build an entity and every relation loaded under it.
pub fn hydrate<E: Entity>(node: &LoadedNode) -> AppResult<E> {
    let mut entity = E::from_record(&node.record)?;
    for (relation, children) in &node.relations {
        entity.attach(relation, children.values().collect())?;
    }
    Ok(entity)
}

/// Hydrate a to-many relation.
pub fn hydrate_all<E: Entity>(nodes: Vec<&LoadedNode>) -> AppResult<Vec<E>> {
    nodes.into_iter().map(hydrate).collect()
}

/// Hydrate a to-one relation; a missing row yields `None`.
pub fn hydrate_one<E: Entity>(nodes: Vec<&LoadedNode>) -> AppResult<Option<Box<E>>> {
    nodes
        .into_iter()
        .next()
        .map(|node| hydrate(node).map(Box::new))
        .transpose()
}
