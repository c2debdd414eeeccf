//! Entity values and versioned value sets

use serde::{de::DeserializeOwned, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::field::{FieldDef, FieldValue};
use super::item::DataItem;
use super::list::DataList;
use super::validation::ValidationErrors;
use crate::security::EncryptedValues;

/// The typed values of one kind of entity
///
/// Implementors declare their field schema once; the framework uses it for
/// equality, hashing, differencing and link resolution. The remaining
/// methods are hooks with no-op defaults.
pub trait DataValues: Clone + fmt::Debug + Serialize + DeserializeOwned + 'static {
    /// Item type name, also the target name of links to this entity
    const ITEM_TYPE: &'static str;

    /// Display name of a list of these items
    const LIST_NAME: &'static str;

    /// Whether the values carry encrypted fields
    const ENCRYPTED: bool = false;

    /// The ordered field schema
    fn fields() -> &'static [FieldDef];

    /// Read a field by its index in [`DataValues::fields`]
    fn field_value(&self, index: usize) -> FieldValue;

    /// Natural ordering of items within a list (ties broken by id)
    fn compare(&self, _other: &Self) -> Ordering {
        Ordering::Equal
    }

    /// Record business-rule failures for an item
    fn validate(_item: &DataItem<Self>, _list: &DataList<Self>, _errors: &mut ValidationErrors) {}

    /// Copy the fields of `other` that differ from `self`
    ///
    /// Returns false when the entity does not support applying changes.
    fn apply_changes(&mut self, _other: &Self) -> bool {
        false
    }

    /// Encrypted-field capability
    fn encrypted(&self) -> Option<&dyn EncryptedValues> {
        None
    }

    /// Mutable encrypted-field capability
    fn encrypted_mut(&mut self) -> Option<&mut dyn EncryptedValues> {
        None
    }
}

/// Current values of an item together with their version and deletion flag
#[derive(Debug, Clone)]
pub struct ValueSet<V> {
    values: V,
    version: u32,
    deleted: bool,
}

impl<V: DataValues> ValueSet<V> {
    pub fn new(values: V, version: u32) -> Self {
        Self {
            values,
            version,
            deleted: false,
        }
    }

    pub fn values(&self) -> &V {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut V {
        &mut self.values
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn set_version(&mut self, version: u32) {
        self.version = version;
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }

    /// Whether every equality field matches
    pub fn equal_fields(&self, other: &Self) -> bool {
        V::fields()
            .iter()
            .enumerate()
            .filter(|(_, f)| f.equality)
            .all(|(i, _)| self.values.field_value(i) == other.values.field_value(i))
    }

    /// Whether any field or the deletion flag differs
    pub fn differs_from(&self, other: &Self) -> bool {
        self.deleted != other.deleted
            || (0..V::fields().len())
                .any(|i| self.values.field_value(i) != other.values.field_value(i))
    }

    /// Names and values (before, after) of the fields that differ from `other`
    pub fn changed_fields(&self, other: &Self) -> Vec<(&'static str, FieldValue, FieldValue)> {
        V::fields()
            .iter()
            .enumerate()
            .filter_map(|(i, f)| {
                let before = other.values.field_value(i);
                let after = self.values.field_value(i);
                (before != after).then_some((f.name, before, after))
            })
            .collect()
    }
}
