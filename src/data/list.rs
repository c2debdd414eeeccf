//! Ordered, id-indexed list of items of one entity type
//!
//! A list owns its items, its identity manager and the list-wide version,
//! generation and style. Bulk operations (derive, difference, rebase,
//! rewind, validate) are implemented here once for every entity.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::identity::IdManager;
use super::item::{DataItem, RewindOutcome};
use super::state::{DataState, EditState, ListStyle};
use super::validation::ValidationErrors;
use super::values::DataValues;
use crate::error::{DataErrorKind, MoneyWiseError, MoneyWiseResult};

#[derive(Debug, Clone)]
pub struct DataList<V> {
    style: ListStyle,
    /// Style of the list this one was derived from
    base_style: Option<ListStyle>,
    version: u32,
    generation: u32,
    edit_state: EditState,
    items: Vec<DataItem<V>>,
    index: HashMap<u32, usize>,
    ids: IdManager,
}

impl<V: DataValues> DataList<V> {
    /// Create an empty list of the given style
    pub fn new(style: ListStyle) -> Self {
        Self {
            style,
            base_style: None,
            version: 0,
            generation: 0,
            edit_state: EditState::Clean,
            items: Vec::new(),
            index: HashMap::new(),
            ids: IdManager::new(),
        }
    }

    /// Create an empty list that inherits the counters of `source`
    fn derived_from<W>(source: &DataList<W>, style: ListStyle) -> Self {
        let mut list = Self::new(style);
        list.base_style = Some(source.style);
        list.version = source.version;
        list.generation = source.generation;
        list
    }

    pub fn style(&self) -> ListStyle {
        self.style
    }

    pub fn base_style(&self) -> Option<ListStyle> {
        self.base_style
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn set_version(&mut self, version: u32) {
        self.version = version;
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn set_generation(&mut self, generation: u32) {
        self.generation = generation;
    }

    pub fn edit_state(&self) -> EditState {
        self.edit_state
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataItem<V>> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DataItem<V>> {
        self.items.iter_mut()
    }

    /// Items that are not deleted
    pub fn live_items(&self) -> impl Iterator<Item = &DataItem<V>> {
        self.items.iter().filter(|i| !i.is_deleted())
    }

    pub fn ids(&self) -> Vec<u32> {
        self.items.iter().map(DataItem::id).collect()
    }

    pub fn find_item_by_id(&self, id: u32) -> Option<&DataItem<V>> {
        self.index.get(&id).map(|&pos| &self.items[pos])
    }

    pub fn find_item_by_id_mut(&mut self, id: u32) -> Option<&mut DataItem<V>> {
        match self.index.get(&id) {
            Some(&pos) => Some(&mut self.items[pos]),
            None => None,
        }
    }

    /// Find an item or fail with a not-found data error
    pub fn item(&self, id: u32) -> MoneyWiseResult<&DataItem<V>> {
        self.find_item_by_id(id)
            .ok_or_else(|| MoneyWiseError::not_found(V::ITEM_TYPE, id))
    }

    pub fn item_mut(&mut self, id: u32) -> MoneyWiseResult<&mut DataItem<V>> {
        self.find_item_by_id_mut(id)
            .ok_or_else(|| MoneyWiseError::not_found(V::ITEM_TYPE, id))
    }

    /// Whether an item with this id exists and is not deleted
    pub fn contains_live_id(&self, id: u32) -> bool {
        self.find_item_by_id(id).is_some_and(|i| !i.is_deleted())
    }

    pub fn is_id_unique(&self, id: u32) -> bool {
        self.ids.is_id_unique(id)
    }

    /// Register an id with the identity manager, allocating one for 0
    pub fn set_new_id(&mut self, id: u32) -> MoneyWiseResult<u32> {
        self.ids.set_new_id(id, V::ITEM_TYPE)
    }

    pub fn max_id(&self) -> u32 {
        self.ids.max_id()
    }

    /// Append an item, registering (or allocating) its id
    pub fn add_item(&mut self, mut item: DataItem<V>) -> MoneyWiseResult<u32> {
        let id = self.set_new_id(item.id())?;
        item.set_id(id);
        self.index.insert(id, self.items.len());
        self.items.push(item);
        Ok(id)
    }

    /// Add an item built from external row data, as loaded (version 0)
    pub fn add_values_item(&mut self, id: u32, values: V) -> MoneyWiseResult<u32> {
        self.add_item(DataItem::new(id, values))
    }

    /// Add a brand-new item created in this session
    pub fn add_new_item(&mut self, values: V) -> MoneyWiseResult<u32> {
        let item = DataItem::with_version(0, values, self.version + 1);
        self.add_item(item)
    }

    /// Add a copy of an item from a list of `source_style`
    pub fn add_copy_item(
        &mut self,
        source: &DataItem<V>,
        source_style: ListStyle,
    ) -> MoneyWiseResult<u32> {
        let item = DataItem::copy_from(source, source_style, self.style, self.version)?;
        self.add_item(item)
    }

    /// Remove an item and release its id
    pub fn unlink(&mut self, id: u32) -> Option<DataItem<V>> {
        let pos = self.index.remove(&id)?;
        let item = self.items.remove(pos);
        self.ids.deregister(id);
        for later in self.index.values_mut().filter(|p| **p > pos) {
            *later -= 1;
        }
        Some(item)
    }

    /// Remove many items at once, returning how many were present
    pub fn unlink_all(&mut self, ids: &[u32]) -> usize {
        let doomed: HashSet<u32> = ids
            .iter()
            .copied()
            .filter(|id| self.index.contains_key(id))
            .collect();
        if doomed.is_empty() {
            return 0;
        }

        self.items.retain(|item| !doomed.contains(&item.id()));
        for id in &doomed {
            self.ids.deregister(*id);
        }
        self.reindex();
        doomed.len()
    }

    /// Push history on one item at the current list version
    pub fn push_history(&mut self, id: u32) -> MoneyWiseResult<()> {
        let version = self.version;
        self.item_mut(id)?.push_history(version);
        Ok(())
    }

    /// Soft-delete an item that nothing references
    pub fn delete_item(&mut self, id: u32) -> MoneyWiseResult<()> {
        let version = self.version;
        let item = self.item_mut(id)?;
        if item.is_active() {
            return Err(MoneyWiseError::data(
                DataErrorKind::InvalidValue,
                V::ITEM_TYPE,
                format!("Item {} is referenced by other items", id),
            ));
        }
        item.set_deleted(true, version);
        Ok(())
    }

    /// Mark an item as referenced
    pub fn touch_item(&mut self, id: u32) {
        if let Some(item) = self.find_item_by_id_mut(id) {
            item.set_active(true);
        }
    }

    pub fn clear_active(&mut self) {
        for item in &mut self.items {
            item.set_active(false);
        }
    }

    /// Whether any item has unsaved changes
    pub fn has_updates(&self) -> bool {
        self.items.iter().any(|i| i.state().has_changes())
    }

    /// Sort by the entity's natural order, then by id
    pub fn sort(&mut self) {
        self.items
            .sort_by(|a, b| a.values().compare(b.values()).then(a.id().cmp(&b.id())));
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index = self
            .items
            .iter()
            .enumerate()
            .map(|(pos, item)| (item.id(), pos))
            .collect();
    }

    /// Build a list of another style from this one
    pub fn derive_list(&self, style: ListStyle) -> MoneyWiseResult<DataList<V>> {
        if style == ListStyle::Copy {
            return Err(MoneyWiseError::IllegalState(format!(
                "Cannot derive a Copy-style {} list",
                V::LIST_NAME
            )));
        }

        let mut list = Self::derived_from(self, style);
        for item in &self.items {
            if style == ListStyle::Update && item.state() == DataState::Clean {
                continue;
            }
            list.add_copy_item(item, self.style)?;
        }

        debug!(
            list = V::LIST_NAME,
            from = %self.style,
            to = %style,
            items = list.len(),
            "Derived list"
        );
        Ok(list)
    }

    /// Three-way difference of this list against an older one
    ///
    /// Every id of either list appears exactly once in the result: new ids
    /// as New, removed ids as Deleted, differing ids as Changed with the old
    /// values as their original, and identical ids as Clean.
    pub fn derive_differences(&self, old: &DataList<V>) -> MoneyWiseResult<DataList<V>> {
        let mut differences = Self::derived_from(self, ListStyle::Differ);
        differences.base_style = Some(old.style);

        let mut remaining: HashMap<u32, &DataItem<V>> =
            old.items.iter().map(|i| (i.id(), i)).collect();

        for item in &self.items {
            let copy = match remaining.remove(&item.id()) {
                None => DataItem::as_new(item),
                Some(previous) if item.differs_from(previous) => {
                    DataItem::as_changed(item, previous)
                }
                Some(_) => DataItem::as_clean(item),
            };
            differences.add_item(copy)?;
        }

        for item in &old.items {
            if remaining.contains_key(&item.id()) {
                differences.add_item(DataItem::as_deleted(item, 1))?;
            }
        }

        differences.sort();
        debug!(
            list = V::LIST_NAME,
            items = differences.len(),
            "Derived differences"
        );
        Ok(differences)
    }

    /// Rewrite this list's history relative to `base`
    pub fn re_base(&mut self, base: &DataList<V>) -> MoneyWiseResult<()> {
        let version = self.version + 1;
        let mut remaining: HashMap<u32, &DataItem<V>> =
            base.items.iter().map(|i| (i.id(), i)).collect();

        for item in &mut self.items {
            match remaining.remove(&item.id()) {
                None => item.rebase_as_new(version),
                Some(original) if item.differs_from(original) => item.rebase_on(original, version),
                Some(original) => item.rebase_clean(original.id()),
            }
        }

        for original in &base.items {
            if remaining.contains_key(&original.id()) {
                self.add_item(DataItem::as_deleted(original, version))?;
            }
        }

        self.version = version;
        self.sort();
        debug!(list = V::LIST_NAME, version, items = self.len(), "Rebased list");
        Ok(())
    }

    /// Undo every change made after `version`
    ///
    /// Returns the ids of the items that were removed because they did not
    /// exist at that version.
    pub fn rewind_to_version(&mut self, version: u32) -> Vec<u32> {
        let mut removed: Vec<u32> = self
            .items
            .iter_mut()
            .filter_map(|item| {
                (item.rewind_to_version(version) == RewindOutcome::Remove).then_some(item.id())
            })
            .collect();

        self.unlink_all(&removed);
        self.version = version;

        if self.style != ListStyle::Edit {
            self.sort();
        }
        self.validate();

        debug!(
            list = V::LIST_NAME,
            version,
            removed = removed.len(),
            "Rewound list"
        );
        removed.sort_unstable();
        removed
    }

    /// Validate every live item and recompute the list edit state
    pub fn validate(&mut self) -> EditState {
        let results: Vec<ValidationErrors> = self
            .items
            .iter()
            .map(|item| {
                let mut errors = ValidationErrors::new();
                if !item.is_deleted() {
                    V::validate(item, self, &mut errors);
                }
                errors
            })
            .collect();

        for (item, errors) in self.items.iter_mut().zip(results) {
            item.set_validation(errors);
        }
        self.find_edit_state()
    }

    /// Aggregate the item edit states into the list edit state
    pub fn find_edit_state(&mut self) -> EditState {
        let mut state = EditState::Clean;
        for item in &self.items {
            match (item.edit_state(), item.is_deleted()) {
                (EditState::Error, false) => {
                    state = EditState::Error;
                    break;
                }
                (EditState::Dirty, false) => state = EditState::Dirty,
                (EditState::Valid, _) if state == EditState::Clean => state = EditState::Valid,
                (s, true) if s != EditState::Clean && state == EditState::Clean => {
                    state = EditState::Valid
                }
                _ => {}
            }
        }
        self.edit_state = state;
        state
    }

    /// Apply the changes recorded in an Update list to this list
    pub fn apply_update(&mut self, update: &DataList<V>) -> MoneyWiseResult<()> {
        for change in &update.items {
            match change.state() {
                DataState::New => {
                    self.add_values_item(change.id(), change.values().clone())?;
                }
                DataState::Changed | DataState::Recovered => {
                    self.item_mut(change.id())?
                        .replace_values(change.values().clone(), false);
                }
                DataState::Deleted => {
                    let item = self.item_mut(change.id())?;
                    let values = item.values().clone();
                    item.replace_values(values, true);
                }
                DataState::DelNew | DataState::Clean | DataState::NoState => {}
            }
        }
        Ok(())
    }

    /// Fold all changes into the base state after a successful save
    pub fn commit(&mut self) {
        let deleted: Vec<u32> = self
            .items
            .iter()
            .filter(|i| i.is_deleted())
            .map(DataItem::id)
            .collect();
        self.unlink_all(&deleted);
        for item in &mut self.items {
            item.commit();
        }
        self.version = 0;
        self.edit_state = EditState::Clean;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::Note;

    fn core_list(texts: &[&str]) -> DataList<Note> {
        let mut list = DataList::new(ListStyle::Core);
        for text in texts {
            list.add_values_item(0, Note::new(text)).unwrap();
        }
        list
    }

    fn edit(list: &mut DataList<Note>, id: u32, text: &str) {
        list.push_history(id).unwrap();
        list.item_mut(id).unwrap().values_mut().text = text.into();
        assert!(list.item_mut(id).unwrap().check_for_history());
    }

    #[test]
    fn test_add_items_assigns_ids() {
        let list = core_list(&["a", "b", "c"]);
        assert_eq!(list.ids(), vec![1, 2, 3]);
        assert_eq!(list.max_id(), 3);
        assert!(!list.is_id_unique(2));
        assert!(list.is_id_unique(4));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut list = core_list(&["a"]);
        let err = list.add_values_item(1, Note::new("b")).unwrap_err();
        assert_eq!(err.data_kind(), Some(DataErrorKind::DuplicateId));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_unlink_releases_id() {
        let mut list = core_list(&["a", "b"]);
        let removed = list.unlink(1).unwrap();
        assert_eq!(removed.values().text, "a");
        assert!(list.is_id_unique(1));
        assert_eq!(list.find_item_by_id(2).unwrap().values().text, "b");
        assert!(list.unlink(1).is_none());
    }

    #[test]
    fn test_delete_active_item_rejected() {
        let mut list = core_list(&["a"]);
        list.touch_item(1);
        assert!(list.delete_item(1).is_err());

        list.clear_active();
        list.delete_item(1).unwrap();
        assert_eq!(list.item(1).unwrap().state(), DataState::Deleted);
    }

    #[test]
    fn test_derive_update_skips_clean() {
        let mut list = core_list(&["a", "b", "c"]);
        edit(&mut list, 2, "x");
        list.add_new_item(Note::new("d")).unwrap();
        list.delete_item(3).unwrap();

        let update = list.derive_list(ListStyle::Update).unwrap();
        assert_eq!(update.style(), ListStyle::Update);
        assert_eq!(update.base_style(), Some(ListStyle::Core));
        assert_eq!(update.ids(), vec![2, 3, 4]);
        assert_eq!(update.item(2).unwrap().state(), DataState::Changed);
        assert_eq!(update.item(3).unwrap().state(), DataState::Deleted);
        assert_eq!(update.item(4).unwrap().state(), DataState::New);
    }

    #[test]
    fn test_derive_copy_rejected() {
        let list = core_list(&["a"]);
        assert!(matches!(
            list.derive_list(ListStyle::Copy),
            Err(MoneyWiseError::IllegalState(_))
        ));
    }

    #[test]
    fn test_derive_edit_from_edit_allocates_new_ids() {
        let core = core_list(&["a", "b"]);
        let edit_list = core.derive_list(ListStyle::Edit).unwrap();
        assert_eq!(edit_list.ids(), vec![1, 2]);

        let second = edit_list.derive_list(ListStyle::Edit).unwrap();
        assert!(second.iter().all(|i| i.state() == DataState::New));
        assert!(second.iter().all(|i| i.base().is_none()));
    }

    #[test]
    fn test_derive_differences_covers_every_id() {
        let old = core_list(&["a", "b", "c"]);
        let mut new = core_list(&["a", "B", "c"]);
        new.unlink(3);
        new.add_values_item(7, Note::new("g")).unwrap();

        let diff = new.derive_differences(&old).unwrap();
        let mut ids = diff.ids();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 7]);

        assert_eq!(diff.item(1).unwrap().state(), DataState::Clean);
        let changed = diff.item(2).unwrap();
        assert_eq!(changed.state(), DataState::Changed);
        assert_eq!(changed.original_values().values().text, "b");
        assert_eq!(changed.values().text, "B");
        assert_eq!(diff.item(3).unwrap().state(), DataState::Deleted);
        assert_eq!(diff.item(7).unwrap().state(), DataState::New);
        assert_eq!(diff.style(), ListStyle::Differ);
    }

    #[test]
    fn test_re_base() {
        let base = core_list(&["a", "b", "c"]);
        let mut list = core_list(&["a", "B"]);
        list.add_values_item(5, Note::new("e")).unwrap();

        list.re_base(&base).unwrap();
        assert_eq!(list.item(1).unwrap().state(), DataState::Clean);
        assert_eq!(list.item(2).unwrap().state(), DataState::Changed);
        assert_eq!(
            list.item(2).unwrap().original_values().values().text,
            "b"
        );
        assert_eq!(list.item(3).unwrap().state(), DataState::Deleted);
        assert_eq!(list.item(5).unwrap().state(), DataState::New);

        assert_eq!(list.version(), 1);
        assert_eq!(list.item(2).unwrap().version(), 1);
        assert_eq!(list.item(5).unwrap().version(), 1);
    }

    #[test]
    fn test_unlink_keeps_index_consistent() {
        let mut list = core_list(&["a", "b", "c", "d", "e"]);
        list.unlink(2).unwrap();
        assert_eq!(list.find_item_by_id(4).unwrap().values().text, "d");

        assert_eq!(list.unlink_all(&[1, 5, 42]), 2);
        assert_eq!(list.ids(), vec![3, 4]);
        assert_eq!(list.find_item_by_id(3).unwrap().values().text, "c");
        assert_eq!(list.find_item_by_id(4).unwrap().values().text, "d");
        assert!(list.is_id_unique(5));
        assert_eq!(list.unlink_all(&[]), 0);
    }

    #[test]
    fn test_rewind_removes_later_items_and_is_idempotent() {
        let mut list = core_list(&["a", "b"]);
        edit(&mut list, 1, "x");
        list.set_version(1);
        let new_id = list.add_new_item(Note::new("c")).unwrap();
        edit(&mut list, 2, "y");
        assert_eq!(list.item(new_id).unwrap().version(), 2);

        let removed = list.rewind_to_version(1);
        assert_eq!(removed, vec![new_id]);
        assert_eq!(list.item(1).unwrap().values().text, "x");
        assert_eq!(list.item(2).unwrap().values().text, "b");
        assert!(list.is_id_unique(new_id));

        assert!(list.rewind_to_version(1).is_empty());
        assert_eq!(list.len(), 2);

        list.rewind_to_version(0);
        assert_eq!(list.item(1).unwrap().values().text, "a");
        assert_eq!(list.edit_state(), EditState::Clean);
    }

    #[test]
    fn test_find_edit_state() {
        let mut list = core_list(&["a", "b"]);
        assert_eq!(list.validate(), EditState::Clean);

        list.push_history(1).unwrap();
        list.item_mut(1).unwrap().values_mut().text = "z".into();
        assert_eq!(list.find_edit_state(), EditState::Dirty);

        assert_eq!(list.validate(), EditState::Valid);

        list.push_history(2).unwrap();
        list.item_mut(2).unwrap().values_mut().text = String::new();
        assert_eq!(list.validate(), EditState::Error);

        list.item_mut(2).unwrap().set_deleted(true, 0);
        assert_eq!(list.validate(), EditState::Valid);
    }

    #[test]
    fn test_round_trip_update() {
        let mut list = core_list(&["a", "b", "c", "d"]);
        let snapshot = list.derive_list(ListStyle::Clone).unwrap();

        edit(&mut list, 1, "x");
        list.delete_item(2).unwrap();
        list.add_new_item(Note::new("e")).unwrap();
        let dropped = list.add_new_item(Note::new("f")).unwrap();
        list.item_mut(dropped).unwrap().set_deleted(true, 0);

        let update = list.derive_list(ListStyle::Update).unwrap();
        let mut restored = snapshot;
        restored.apply_update(&update).unwrap();

        let live = |l: &DataList<Note>| -> Vec<DataItem<Note>> {
            let mut items: Vec<_> = l.live_items().cloned().collect();
            items.sort_by_key(DataItem::id);
            items
        };
        assert_eq!(live(&restored), live(&list));
    }

    #[test]
    fn test_commit_purges_deleted_and_history() {
        let mut list = core_list(&["a", "b"]);
        edit(&mut list, 1, "x");
        list.delete_item(2).unwrap();
        list.set_version(3);

        list.commit();
        assert_eq!(list.ids(), vec![1]);
        assert_eq!(list.version(), 0);
        assert!(!list.has_updates());
        assert_eq!(list.item(1).unwrap().state(), DataState::Clean);
    }

    #[test]
    fn test_sort_orders_by_entity_then_id() {
        let mut list = core_list(&["c", "a", "b"]);
        list.sort();
        assert_eq!(list.ids(), vec![2, 3, 1]);
        assert_eq!(list.find_item_by_id(1).unwrap().values().text, "c");
    }
}
