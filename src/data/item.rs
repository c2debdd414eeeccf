//! Versioned, validated data item
//!
//! A `DataItem` pairs an entity's current [`ValueSet`] with a [`History`] of
//! earlier snapshots. Versions are assigned by the owning list: pushing
//! history stamps the current values with `list version + 1`, and rewinding
//! pops snapshots until the item is back at or below a given version.

use std::hash::{Hash, Hasher};

use super::field::{FieldValue, HASH_PRIME};
use super::history::History;
use super::state::{DataState, EditState, ListStyle};
use super::validation::ValidationErrors;
use super::values::{DataValues, ValueSet};
use crate::error::{MoneyWiseError, MoneyWiseResult};

/// What happened to an item asked to rewind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewindOutcome {
    /// Already at or below the target version
    Untouched,
    /// History popped back to the target version
    Rewound,
    /// The item did not exist at the target version
    Remove,
}

/// A single versioned record
#[derive(Debug, Clone)]
pub struct DataItem<V> {
    id: u32,
    values: ValueSet<V>,
    history: History<V>,
    errors: ValidationErrors,
    edit_state: EditState,
    /// Id of the item this one was derived from, in the source list
    base: Option<u32>,
    active: bool,
    header: bool,
}

impl<V: DataValues> DataItem<V> {
    /// Create an item at version 0 with empty history
    pub fn new(id: u32, values: V) -> Self {
        Self::with_version(id, values, 0)
    }

    pub fn with_version(id: u32, values: V, version: u32) -> Self {
        Self {
            id,
            values: ValueSet::new(values, version),
            history: History::default(),
            errors: ValidationErrors::new(),
            edit_state: EditState::Clean,
            base: None,
            active: false,
            header: false,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    pub fn values(&self) -> &V {
        self.values.values()
    }

    /// Mutable access to the current values
    ///
    /// Callers push history first so that the change is versioned.
    pub fn values_mut(&mut self) -> &mut V {
        self.values.values_mut()
    }

    pub fn value_set(&self) -> &ValueSet<V> {
        &self.values
    }

    pub fn version(&self) -> u32 {
        self.values.version()
    }

    /// Version of the oldest recorded values
    pub fn original_version(&self) -> u32 {
        self.original_values().version()
    }

    /// The oldest recorded values, or the current ones without history
    pub fn original_values(&self) -> &ValueSet<V> {
        self.history.original().unwrap_or(&self.values)
    }

    pub fn history(&self) -> &History<V> {
        &self.history
    }

    pub fn is_deleted(&self) -> bool {
        self.values.is_deleted()
    }

    pub fn base(&self) -> Option<u32> {
        self.base
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn is_header(&self) -> bool {
        self.header
    }

    pub fn set_header(&mut self, header: bool) {
        self.header = header;
    }

    pub fn edit_state(&self) -> EditState {
        self.edit_state
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn field_value(&self, index: usize) -> FieldValue {
        self.values.values().field_value(index)
    }

    /// Lifecycle state derived from the original and current values
    pub fn state(&self) -> DataState {
        if self.header {
            return DataState::NoState;
        }

        let current = &self.values;
        let original = self.original_values();

        if original.version() > 0 {
            return if current.is_deleted() {
                DataState::DelNew
            } else {
                DataState::New
            };
        }

        if current.version() == 0 {
            return if current.is_deleted() {
                DataState::Deleted
            } else {
                DataState::Clean
            };
        }

        if current.is_deleted() {
            DataState::Deleted
        } else if original.is_deleted() {
            DataState::Recovered
        } else {
            DataState::Changed
        }
    }

    /// Snapshot the current values and move to `list_version + 1`
    pub fn push_history(&mut self, list_version: u32) {
        let next = list_version + 1;
        let already_checkpointed = self.values.version() == next
            && self
                .history
                .peek()
                .is_some_and(|prev| !self.values.differs_from(prev));
        if !already_checkpointed {
            self.history.push(self.values.clone());
            self.values.set_version(next);
        }
        self.edit_state = EditState::Dirty;
    }

    /// Restore the most recent snapshot
    pub fn pop_history(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.values = previous;
                true
            }
            None => false,
        }
    }

    /// Drop the last snapshot if nothing actually changed
    ///
    /// Returns true when a genuine change was retained.
    pub fn check_for_history(&mut self) -> bool {
        let unchanged = match self.history.peek() {
            Some(previous) => !self.values.differs_from(previous),
            None => return false,
        };

        if unchanged {
            self.pop_history();
            if self.history.is_empty() {
                self.edit_state = EditState::Clean;
            }
            return false;
        }
        true
    }

    pub fn has_history(&self) -> bool {
        !self.history.is_empty()
    }

    /// Forget all history, keeping the current values
    pub fn reset_history(&mut self) {
        self.history.clear();
    }

    /// Undo every change made after `version`
    pub fn rewind_to_version(&mut self, version: u32) -> RewindOutcome {
        if self.version() <= version {
            return RewindOutcome::Untouched;
        }

        if self.original_version() > version {
            return RewindOutcome::Remove;
        }

        while self.version() > version {
            if !self.pop_history() {
                break;
            }
        }

        self.clear_errors();
        RewindOutcome::Rewound
    }

    /// Toggle the deletion flag as a versioned change
    pub fn set_deleted(&mut self, deleted: bool, list_version: u32) {
        if deleted == self.is_deleted() {
            return;
        }
        self.push_history(list_version);
        self.values.set_deleted(deleted);
    }

    /// Take over the divergent fields of `other`
    ///
    /// Returns true when a genuine change resulted.
    pub fn apply_changes(&mut self, other: &DataItem<V>, list_version: u32) -> bool {
        self.push_history(list_version);
        if !self.values.values_mut().apply_changes(other.values()) {
            self.pop_history();
            return false;
        }
        self.check_for_history()
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
        if self.edit_state == EditState::Error {
            self.edit_state = EditState::Dirty;
        }
    }

    /// Record a single failure against a field
    pub fn add_error(
        &mut self,
        field: &'static str,
        kind: crate::error::DataErrorKind,
        message: impl Into<String>,
    ) {
        self.errors.add_error(field, kind, message);
        self.edit_state = EditState::Error;
    }

    /// Drop every error of one kind, recomputing the edit state if any went
    pub(crate) fn clear_error_kind(&mut self, kind: crate::error::DataErrorKind) {
        if !self.errors.has_kind(kind) {
            return;
        }
        let mut errors = std::mem::take(&mut self.errors);
        errors.remove_kind(kind);
        self.set_validation(errors);
    }

    /// Install the result of a validation pass
    pub(crate) fn set_validation(&mut self, errors: ValidationErrors) {
        self.edit_state = if errors.has_errors() {
            EditState::Error
        } else if self.state() == DataState::Clean {
            EditState::Clean
        } else {
            EditState::Valid
        };
        self.errors = errors;
    }

    /// Whether the current values or deletion flag differ from `other`
    pub fn differs_from(&self, other: &DataItem<V>) -> bool {
        self.values.differs_from(&other.values)
    }

    /// Fields changed relative to the original values
    pub fn changed_fields(&self) -> Vec<(&'static str, FieldValue, FieldValue)> {
        self.values.changed_fields(self.original_values())
    }

    /// Hash over the id and every equality field
    pub fn item_hash(&self) -> i32 {
        V::fields()
            .iter()
            .enumerate()
            .filter(|(_, f)| f.equality)
            .fold(self.id as i32, |hash, (i, _)| {
                hash.wrapping_mul(HASH_PRIME)
                    .wrapping_add(self.field_value(i).field_hash())
            })
    }

    /// Build an item for a list of `target` style from an item of `source` style
    ///
    /// The returned item carries id 0 when the target list must allocate a
    /// fresh id.
    pub fn copy_from(
        source: &DataItem<V>,
        source_style: ListStyle,
        target_style: ListStyle,
        list_version: u32,
    ) -> MoneyWiseResult<Self> {
        let mut item = Self::with_version(source.id, source.values().clone(), source.version());
        item.values.set_deleted(source.is_deleted());

        match (target_style, source_style) {
            (ListStyle::Copy, _) => {
                return Err(MoneyWiseError::IllegalState(format!(
                    "Cannot create a Copy-style {} item",
                    V::ITEM_TYPE
                )));
            }
            (ListStyle::Update, _) => {
                item.base = Some(source.id);
                match source.state() {
                    DataState::New | DataState::DelNew => item.values.set_version(1),
                    DataState::Deleted => {
                        let mut original = source.original_values().clone();
                        original.set_version(0);
                        original.set_deleted(false);
                        item.history.set_original(original);
                        item.values.set_version(1);
                    }
                    DataState::Changed | DataState::Recovered => {
                        let mut original = source.original_values().clone();
                        original.set_version(0);
                        item.history.set_original(original);
                        item.values.set_version(1);
                    }
                    DataState::Clean | DataState::NoState => {}
                }
            }
            (ListStyle::Edit, ListStyle::Edit) | (ListStyle::Core, ListStyle::Edit) => {
                item.id = 0;
                item.values.set_version(list_version + 1);
            }
            (ListStyle::Edit, _) => {
                item.base = Some(source.id);
                item.active = source.active;
                item.header = source.header;
            }
            (ListStyle::Core, _) => {
                item.values.set_version(list_version + 1);
            }
            (ListStyle::Clone, _) => {
                item.history = source.history.clone();
                item.errors = source.errors.clone();
                item.edit_state = source.edit_state;
                item.base = source.base;
                item.active = source.active;
                item.header = source.header;
            }
            (ListStyle::Differ, _) => {
                item.base = Some(source.id);
            }
        }

        Ok(item)
    }

    /// Copy of `source` marked as new at version 1
    pub(crate) fn as_new(source: &DataItem<V>) -> Self {
        let mut item = Self::with_version(source.id, source.values().clone(), 1);
        item.values.set_deleted(source.is_deleted());
        item
    }

    /// Copy of `current` recording `original` as the values it replaced
    pub(crate) fn as_changed(current: &DataItem<V>, original: &DataItem<V>) -> Self {
        let mut item = Self::with_version(current.id, current.values().clone(), 1);
        item.values.set_deleted(current.is_deleted());
        item.history.set_original(Self::original_snapshot(original));
        item.base = Some(original.id);
        item
    }

    /// Unchanged copy of `source` at version 0
    pub(crate) fn as_clean(source: &DataItem<V>) -> Self {
        let mut item = Self::new(source.id, source.values().clone());
        item.values.set_deleted(source.is_deleted());
        item.base = Some(source.id);
        item
    }

    /// Deleted copy of `original` with its values recorded as history
    pub(crate) fn as_deleted(original: &DataItem<V>, version: u32) -> Self {
        let mut item = Self::with_version(original.id, original.values().clone(), version);
        item.values.set_deleted(true);
        item.history.set_original(Self::original_snapshot(original));
        item.base = Some(original.id);
        item
    }

    fn original_snapshot(original: &DataItem<V>) -> ValueSet<V> {
        let mut snapshot = original.values.clone();
        snapshot.set_version(0);
        snapshot
    }

    /// Treat the item as created since the base
    pub(crate) fn rebase_as_new(&mut self, version: u32) {
        self.history.clear();
        self.values.set_version(version);
        self.base = None;
    }

    /// Treat `original` as the values this item replaced
    pub(crate) fn rebase_on(&mut self, original: &DataItem<V>, version: u32) {
        self.history.set_original(Self::original_snapshot(original));
        self.values.set_version(version);
        self.base = Some(original.id);
    }

    /// Treat the item as unchanged since the base
    pub(crate) fn rebase_clean(&mut self, base_id: u32) {
        self.history.clear();
        self.values.set_version(0);
        self.base = Some(base_id);
    }

    /// Overwrite the current values without recording history
    pub(crate) fn replace_values(&mut self, values: V, deleted: bool) {
        *self.values.values_mut() = values;
        self.values.set_deleted(deleted);
    }

    /// Forget history and versions after a successful save
    pub(crate) fn commit(&mut self) {
        self.history.clear();
        self.values.set_version(0);
        self.base = None;
        self.errors.clear();
        self.edit_state = EditState::Clean;
    }
}

impl<V: DataValues> PartialEq for DataItem<V> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.values.equal_fields(&other.values)
    }
}

impl<V: DataValues> Eq for DataItem<V> {}

impl<V: DataValues> Hash for DataItem<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.item_hash());
    }
}
