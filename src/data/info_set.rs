//! Optional typed attributes attached to an owner item
//!
//! Info items live in their own list; a `DataInfoSet` indexes the entries
//! belonging to one owner by info class, at most one entry per class.

use std::collections::BTreeMap;
use std::fmt;

use super::item::DataItem;
use super::list::DataList;
use super::static_data::{StaticClass, StaticValues};
use super::values::DataValues;
use crate::error::{DataErrorKind, MoneyWiseError, MoneyWiseResult};

/// Values of an info item
pub trait InfoValues: DataValues {
    /// Item type of the owning entity
    const OWNER_TYPE: &'static str;

    type Class: StaticClass;
    type Value: Clone + PartialEq + fmt::Debug;

    /// Build a new entry for `owner` of the given class and info-type item
    fn new_info(owner: u32, info_type: u32, class: Self::Class, value: Self::Value) -> Self;

    fn owner(&self) -> u32;
    fn set_owner(&mut self, owner: u32);
    fn info_class(&self) -> Self::Class;
    fn value(&self) -> Option<&Self::Value>;
    fn set_value(&mut self, value: Self::Value);
}

#[derive(Debug, Clone)]
pub struct DataInfoSet<V: InfoValues> {
    owner: u32,
    entries: BTreeMap<V::Class, u32>,
}

impl<V: InfoValues> DataInfoSet<V> {
    pub fn new(owner: u32) -> Self {
        Self {
            owner,
            entries: BTreeMap::new(),
        }
    }

    /// Index the live entries of `owner` already present in `list`
    pub fn build(owner: u32, list: &DataList<V>) -> MoneyWiseResult<Self> {
        let mut set = Self::new(owner);
        for item in list.live_items().filter(|i| i.values().owner() == owner) {
            set.register_info(item)?;
        }
        Ok(set)
    }

    pub fn owner(&self) -> u32 {
        self.owner
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn classes(&self) -> impl Iterator<Item = V::Class> + '_ {
        self.entries.keys().copied()
    }

    /// Id of the info item for a class
    pub fn info_id(&self, class: V::Class) -> Option<u32> {
        self.entries.get(&class).copied()
    }

    pub fn register_info(&mut self, item: &DataItem<V>) -> MoneyWiseResult<()> {
        let class = item.values().info_class();
        if self.entries.contains_key(&class) {
            return Err(MoneyWiseError::data(
                DataErrorKind::DuplicateInfoType,
                V::ITEM_TYPE,
                format!("Duplicate info type {} for owner {}", class.name(), self.owner),
            ));
        }
        self.entries.insert(class, item.id());
        Ok(())
    }

    pub fn deregister_info(&mut self, class: V::Class) -> Option<u32> {
        self.entries.remove(&class)
    }

    /// The current value for a class, ignoring deleted entries
    pub fn get_value<'a>(&self, class: V::Class, list: &'a DataList<V>) -> Option<&'a V::Value> {
        let item = list.find_item_by_id(self.info_id(class)?)?;
        if item.is_deleted() {
            return None;
        }
        item.values().value()
    }

    /// Set or clear the value for a class
    ///
    /// Clearing soft-deletes the entry. Setting creates the entry on first
    /// use, revives a deleted one, or records history and overwrites.
    pub fn set_value(
        &mut self,
        class: V::Class,
        value: Option<V::Value>,
        list: &mut DataList<V>,
        types: &DataList<StaticValues<V::Class>>,
    ) -> MoneyWiseResult<()> {
        let version = list.version();
        match (self.info_id(class), value) {
            (None, None) => {}
            (Some(id), None) => list.item_mut(id)?.set_deleted(true, version),
            (None, Some(value)) => {
                let info_type = types.find_item_by_class(class).ok_or_else(|| {
                    MoneyWiseError::not_found(<V::Class as StaticClass>::ITEM_TYPE, class.name())
                })?;
                let id = list.add_new_item(V::new_info(self.owner, info_type.id(), class, value))?;
                self.entries.insert(class, id);
            }
            (Some(id), Some(value)) => {
                let item = list.item_mut(id)?;
                if item.is_deleted() {
                    item.set_deleted(false, version);
                } else {
                    item.push_history(version);
                }
                item.values_mut().set_value(value);
                item.check_for_history();
            }
        }
        Ok(())
    }

    pub fn push_history(&self, list: &mut DataList<V>) -> MoneyWiseResult<()> {
        for &id in self.entries.values() {
            list.push_history(id)?;
        }
        Ok(())
    }

    /// Pop history on every entry, returning whether any entry changed
    pub fn pop_history(&self, list: &mut DataList<V>) -> bool {
        self.fan_out(list, DataItem::pop_history)
    }

    /// Drop no-op history on every entry, returning whether any change remains
    pub fn check_for_history(&self, list: &mut DataList<V>) -> bool {
        self.fan_out(list, DataItem::check_for_history)
    }

    pub fn has_history(&self, list: &DataList<V>) -> bool {
        self.entries
            .values()
            .filter_map(|&id| list.find_item_by_id(id))
            .any(DataItem::has_history)
    }

    fn fan_out(&self, list: &mut DataList<V>, op: fn(&mut DataItem<V>) -> bool) -> bool {
        let mut any = false;
        for &id in self.entries.values() {
            if let Some(item) = list.find_item_by_id_mut(id) {
                any |= op(item);
            }
        }
        any
    }

    /// Copy every live entry to a new owner
    pub fn duplicate(&self, new_owner: u32, list: &mut DataList<V>) -> MoneyWiseResult<Self> {
        let copies: Vec<V> = self
            .entries
            .values()
            .filter_map(|&id| list.find_item_by_id(id))
            .filter(|item| !item.is_deleted())
            .map(|item| {
                let mut values = item.values().clone();
                values.set_owner(new_owner);
                values
            })
            .collect();

        let mut set = Self::new(new_owner);
        for values in copies {
            let class = values.info_class();
            let id = list.add_new_item(values)?;
            set.entries.insert(class, id);
        }
        Ok(set)
    }

    /// Remove every entry of the owner from the list, deleted ones included
    ///
    /// Returns the number of items removed.
    pub fn unlink_owner(&mut self, list: &mut DataList<V>) -> usize {
        self.entries.clear();
        let owned: Vec<u32> = list
            .iter()
            .filter(|item| item.values().owner() == self.owner)
            .map(DataItem::id)
            .collect();
        list.unlink_all(&owned)
    }
}
