use std::marker::PhantomData;

use projectx_core::{AppError, AppResult};
use projectx_entity::{Entity, EntityMeta, Value};

/// Column assignments for bulk updates, validated against the entity's
/// properties. Audit columns are stamped by the repository and cannot be set.
#[derive(Debug, Clone)]
pub struct UpdateSpec<E: Entity> {
    assignments: Vec<(&'static str, Value)>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Default for UpdateSpec<E> {
    fn default() -> Self {
        Self {
            assignments: Vec::new(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> UpdateSpec<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `value` to `property`. Setting a property twice keeps the last value.
    pub fn set(mut self, property: &str, value: impl Into<Value>) -> AppResult<Self> {
        let meta = E::meta();
        if EntityMeta::is_audit_field(property) {
            return Err(AppError::invalid_field(
                meta.name,
                property,
                format!("Audit property '{property}' of {} cannot be updated directly", meta.name),
            ));
        }
        let field = meta
            .fields
            .iter()
            .find(|f| f.property == property)
            .ok_or_else(|| {
                AppError::invalid_field(
                    meta.name,
                    property,
                    format!("Unknown property '{property}' for {}", meta.name),
                )
            })?;
        let value = value.into();
        match self.assignments.iter_mut().find(|(column, _)| *column == field.column) {
            Some(existing) => existing.1 = value,
            None => self.assignments.push((field.column, value)),
        }
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn assignments(&self) -> &[(&'static str, Value)] {
        &self.assignments
    }
}

#[cfg(test)]
mod tests {
    use projectx_core::ErrorKind;
    use projectx_entity::administrator::{Administrator, AdministratorStatus};

    use super::*;

    #[test]
    fn test_set_maps_property_to_column() {
        let spec = UpdateSpec::<Administrator>::new()
            .set("loginId", "root")
            .unwrap()
            .set("status", AdministratorStatus::Suspended)
            .unwrap()
            .set("loginId", "admin")
            .unwrap();
        assert_eq!(
            spec.assignments(),
            &[
                ("login_id", Value::from("admin")),
                ("status", Value::from("SUSPENDED")),
            ]
        );
    }

    #[test]
    fn test_rejects_audit_and_unknown_properties() {
        let err = UpdateSpec::<Administrator>::new()
            .set("updatedBy", 3_i64)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);

        let err = UpdateSpec::<Administrator>::new()
            .set("nickname", "x")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.message.contains("Administrator"));
    }
}
