//! Type-erased list operations
//!
//! A `DataSet` holds lists of many entity types. `ListOps` exposes the
//! operations it needs on any of them, implemented once for every
//! `DataList<V>`.

use std::any::Any;
use std::fmt;

use super::field::{FieldKind, FieldValue};
use super::list::DataList;
use super::state::{EditState, ListStyle};
use super::task::{check_continue, TaskControl};
use super::values::DataValues;
use crate::error::{DataErrorKind, MoneyWiseError, MoneyWiseResult};
use crate::report::{summarize_item, ChangeRow};
use crate::security::KeyRing;
use crate::storage::{ListSnapshot, StoredItem};

/// A link from one item to another, read from a link field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRef {
    pub item_id: u32,
    pub field: &'static str,
    pub target: &'static str,
    pub target_id: u32,
}

pub trait ListOps: Any + fmt::Debug {
    fn item_type(&self) -> &'static str;
    fn list_name(&self) -> &'static str;
    fn style(&self) -> ListStyle;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn version(&self) -> u32;
    fn set_version(&mut self, version: u32);
    fn generation(&self) -> u32;
    fn set_generation(&mut self, generation: u32);
    fn edit_state(&self) -> EditState;
    fn find_edit_state(&mut self) -> EditState;
    fn validate(&mut self) -> EditState;
    fn has_updates(&self) -> bool;

    /// Undo changes after `version`, returning the removed ids
    fn rewind_to_version(&mut self, version: u32) -> Vec<u32>;
    fn commit(&mut self);

    fn contains_live_id(&self, id: u32) -> bool;
    fn links(&self) -> Vec<LinkRef>;
    fn clear_active(&mut self);
    /// Forget link errors from an earlier resolution
    fn clear_link_errors(&mut self);
    fn touch_item(&mut self, id: u32);
    fn record_error(&mut self, id: u32, field: &'static str, kind: DataErrorKind, message: String);

    fn derive_boxed(&self, style: ListStyle) -> MoneyWiseResult<Box<dyn ListOps>>;
    fn derive_differences_boxed(&self, old: &dyn ListOps) -> MoneyWiseResult<Box<dyn ListOps>>;
    fn re_base_boxed(&mut self, base: &dyn ListOps) -> MoneyWiseResult<()>;

    /// Whether the entity carries encrypted fields
    fn is_encrypted(&self) -> bool;
    /// Encrypt values that have no ciphertext yet, adopting `control_key` where unset
    fn seal(&mut self, ring: &KeyRing, control_key: u32) -> MoneyWiseResult<()>;
    /// Decrypt every value with the key of its control key
    fn unlock(&mut self, ring: &KeyRing) -> MoneyWiseResult<()>;
    /// Re-encrypt every item not yet under `control_key`, returning how many changed
    fn update_security(
        &mut self,
        ring: &KeyRing,
        control_key: u32,
        task: &mut dyn TaskControl,
        report_interval: usize,
    ) -> MoneyWiseResult<usize>;

    fn to_snapshot(&self) -> MoneyWiseResult<ListSnapshot>;
    fn load_snapshot(&mut self, snapshot: &ListSnapshot) -> MoneyWiseResult<()>;
    fn change_rows(&self) -> Vec<ChangeRow>;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

fn downcast<'a, V: DataValues>(list: &'a dyn ListOps) -> MoneyWiseResult<&'a DataList<V>> {
    list.as_any().downcast_ref::<DataList<V>>().ok_or_else(|| {
        MoneyWiseError::IllegalState(format!(
            "Expected a {} list, found {}",
            V::LIST_NAME,
            list.list_name()
        ))
    })
}

impl<V: DataValues> ListOps for DataList<V> {
    fn item_type(&self) -> &'static str {
        V::ITEM_TYPE
    }

    fn list_name(&self) -> &'static str {
        V::LIST_NAME
    }

    fn style(&self) -> ListStyle {
        DataList::style(self)
    }

    fn len(&self) -> usize {
        DataList::len(self)
    }

    fn version(&self) -> u32 {
        DataList::version(self)
    }

    fn set_version(&mut self, version: u32) {
        DataList::set_version(self, version);
    }

    fn generation(&self) -> u32 {
        DataList::generation(self)
    }

    fn set_generation(&mut self, generation: u32) {
        DataList::set_generation(self, generation);
    }

    fn edit_state(&self) -> EditState {
        DataList::edit_state(self)
    }

    fn find_edit_state(&mut self) -> EditState {
        DataList::find_edit_state(self)
    }

    fn validate(&mut self) -> EditState {
        DataList::validate(self)
    }

    fn has_updates(&self) -> bool {
        DataList::has_updates(self)
    }

    fn rewind_to_version(&mut self, version: u32) -> Vec<u32> {
        DataList::rewind_to_version(self, version)
    }

    fn commit(&mut self) {
        DataList::commit(self);
    }

    fn contains_live_id(&self, id: u32) -> bool {
        DataList::contains_live_id(self, id)
    }

    fn links(&self) -> Vec<LinkRef> {
        let mut links = Vec::new();
        for item in self.live_items() {
            for (index, field) in V::fields().iter().enumerate() {
                let FieldKind::Link(target) = field.kind else {
                    continue;
                };
                if let FieldValue::Link(target_id) = item.field_value(index) {
                    links.push(LinkRef {
                        item_id: item.id(),
                        field: field.name,
                        target,
                        target_id,
                    });
                }
            }
        }
        links
    }

    fn clear_active(&mut self) {
        DataList::clear_active(self);
    }

    fn clear_link_errors(&mut self) {
        for item in self.iter_mut() {
            item.clear_error_kind(DataErrorKind::InvalidLink);
        }
    }

    fn touch_item(&mut self, id: u32) {
        DataList::touch_item(self, id);
    }

    fn record_error(&mut self, id: u32, field: &'static str, kind: DataErrorKind, message: String) {
        if let Some(item) = self.find_item_by_id_mut(id) {
            item.add_error(field, kind, message);
        }
    }

    fn derive_boxed(&self, style: ListStyle) -> MoneyWiseResult<Box<dyn ListOps>> {
        Ok(Box::new(self.derive_list(style)?))
    }

    fn derive_differences_boxed(&self, old: &dyn ListOps) -> MoneyWiseResult<Box<dyn ListOps>> {
        let old = downcast::<V>(old)?;
        Ok(Box::new(self.derive_differences(old)?))
    }

    fn re_base_boxed(&mut self, base: &dyn ListOps) -> MoneyWiseResult<()> {
        let base = downcast::<V>(base)?;
        self.re_base(base)
    }

    fn is_encrypted(&self) -> bool {
        V::ENCRYPTED
    }

    fn seal(&mut self, ring: &KeyRing, control_key: u32) -> MoneyWiseResult<()> {
        for item in self.iter_mut() {
            if let Some(values) = item.values_mut().encrypted_mut() {
                if values.control_key() == 0 {
                    values.set_control_key(control_key);
                }
                values.encrypt_fields(ring.key(values.control_key())?, false)?;
            }
        }
        Ok(())
    }

    fn unlock(&mut self, ring: &KeyRing) -> MoneyWiseResult<()> {
        for item in self.iter_mut() {
            if let Some(values) = item.values_mut().encrypted_mut() {
                values.decrypt_fields(ring.key(values.control_key())?)?;
            }
        }
        Ok(())
    }

    fn update_security(
        &mut self,
        ring: &KeyRing,
        control_key: u32,
        task: &mut dyn TaskControl,
        report_interval: usize,
    ) -> MoneyWiseResult<usize> {
        if !V::ENCRYPTED {
            return Ok(0);
        }

        let stage = V::LIST_NAME;
        check_continue(task.set_new_stage(stage), stage)?;
        check_continue(task.set_num_steps(DataList::len(self)), stage)?;

        let target = ring.key(control_key)?;
        let mut updated = 0;
        for (done, item) in self.iter_mut().enumerate() {
            if let Some(values) = item.values_mut().encrypted_mut() {
                let current = values.control_key();
                if current != control_key {
                    if values.is_locked() {
                        values.decrypt_fields(ring.key(current)?)?;
                    }
                    values.encrypt_fields(target, true)?;
                    values.set_control_key(control_key);
                    updated += 1;
                }
            }
            if report_interval > 0 && (done + 1) % report_interval == 0 {
                check_continue(task.set_steps_done(done + 1), stage)?;
            }
        }

        check_continue(task.set_steps_done(DataList::len(self)), stage)?;
        Ok(updated)
    }

    fn to_snapshot(&self) -> MoneyWiseResult<ListSnapshot> {
        let items = self
            .iter()
            .map(|item| {
                Ok(StoredItem {
                    id: item.id(),
                    values: serde_json::to_value(item.values())?,
                    deleted: item.is_deleted(),
                })
            })
            .collect::<MoneyWiseResult<Vec<_>>>()?;

        Ok(ListSnapshot {
            item_type: V::ITEM_TYPE.to_string(),
            items,
        })
    }

    fn load_snapshot(&mut self, snapshot: &ListSnapshot) -> MoneyWiseResult<()> {
        for row in &snapshot.items {
            let values: V = serde_json::from_value(row.values.clone())?;
            let id = self.add_values_item(row.id, values)?;
            if row.deleted {
                let item = self.item_mut(id)?;
                let values = item.values().clone();
                item.replace_values(values, true);
            }
        }
        self.sort();
        Ok(())
    }

    fn change_rows(&self) -> Vec<ChangeRow> {
        self.iter()
            .filter(|item| item.state().has_changes())
            .map(|item| ChangeRow {
                list: V::LIST_NAME.to_string(),
                id: item.id(),
                state: item.state(),
                summary: summarize_item(item),
            })
            .collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
