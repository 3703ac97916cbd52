//! Change tracking for entities replayed from a broker catalog.

use serde::Serialize;
use serde::ser::Error as _;
use std::ops::Deref;

use crate::error::Result;

/// Field name to value mapping of an entity or event record.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

/// Facts the persistence layer knows about an entity.
pub trait ChangeTracked {
    /// Whether the entity has never been persisted.
    fn is_new(&self) -> bool;

    /// Whether `field` differs from its last persisted value.
    fn was_modified(&self, field: &str) -> bool;

    /// Current field values.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity cannot be represented as a map.
    fn to_field_map(&self) -> Result<FieldMap>;

    /// Fields that are new or modified since the last save.
    ///
    /// A new entity reports every field. The default asks
    /// [`was_modified`](Self::was_modified) once per field.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity cannot be represented as a map.
    fn changed_fields(&self) -> Result<FieldMap> {
        let is_new = self.is_new();
        Ok(self
            .to_field_map()?
            .into_iter()
            .filter(|(field, _)| is_new || self.was_modified(field))
            .collect())
    }
}

/// Serializes `value` into a field map.
///
/// # Errors
///
/// Fails if `value` does not serialize to a JSON object.
pub fn field_map<T: Serialize + ?Sized>(value: &T) -> Result<FieldMap> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(serde_json::Error::custom("entity must serialize to an object").into()),
    }
}

/// An entity paired with the field values it was last persisted with.
#[derive(Debug, Clone, PartialEq)]
pub struct Tracked<T> {
    entity: T,
    persisted: Option<FieldMap>,
}

impl<T: Serialize> Tracked<T> {
    /// Wraps an entity that has never been saved.
    #[must_use]
    pub const fn new(entity: T) -> Self {
        Self {
            entity,
            persisted: None,
        }
    }

    /// Wraps an entity as it was just loaded from storage.
    ///
    /// # Errors
    ///
    /// Fails if the entity cannot be snapshotted.
    pub fn loaded(entity: T) -> Result<Self> {
        let persisted = Some(field_map(&entity)?);
        Ok(Self { entity, persisted })
    }

    /// Mutable access to the entity; changes show up as modified fields.
    pub fn entity_mut(&mut self) -> &mut T {
        &mut self.entity
    }

    /// Records the current field values as persisted.
    ///
    /// # Errors
    ///
    /// Fails if the entity cannot be snapshotted.
    pub fn mark_saved(&mut self) -> Result<()> {
        self.persisted = Some(field_map(&self.entity)?);
        Ok(())
    }

    /// Unwraps the entity.
    pub fn into_inner(self) -> T {
        self.entity
    }
}

impl<T> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.entity
    }
}

impl<T: Serialize> ChangeTracked for Tracked<T> {
    fn is_new(&self) -> bool {
        self.persisted.is_none()
    }

    fn was_modified(&self, field: &str) -> bool {
        let Some(persisted) = &self.persisted else {
            return true;
        };
        // An entity that cannot be snapshotted is treated as changed.
        field_map(&self.entity).map_or(true, |current| current.get(field) != persisted.get(field))
    }

    fn to_field_map(&self) -> Result<FieldMap> {
        field_map(&self.entity)
    }

    /// Compares one snapshot against the persisted one. A field that no
    /// longer serializes is reported as `null`.
    fn changed_fields(&self) -> Result<FieldMap> {
        let current = field_map(&self.entity)?;
        let Some(persisted) = &self.persisted else {
            return Ok(current);
        };
        let removed: Vec<String> = persisted
            .keys()
            .filter(|field| !current.contains_key(*field))
            .cloned()
            .collect();
        let mut changes: FieldMap = current
            .into_iter()
            .filter(|(field, value)| persisted.get(field) != Some(value))
            .collect();
        for field in removed {
            changes.insert(field, serde_json::Value::Null);
        }
        Ok(changes)
    }
}
