//! The aggregate of every list making up one MoneyWise data set
//!
//! A `DataSet` owns the three security lists (control keys, data keys and
//! the control record) plus a registry of entity lists in dependency
//! order. Bulk operations are broadcast to every list, and the security
//! lifecycle (initialise, unlock, renew, self-heal) is driven from here.

use std::fmt;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::info_set::{DataInfoSet, InfoValues};
use super::item::DataItem;
use super::list::DataList;
use super::list_ops::{LinkRef, ListOps};
use super::state::{EditState, ListStyle};
use super::task::TaskControl;
use super::values::DataValues;
use crate::config::SecuritySettings;
use crate::crypto::DerivedKey;
use crate::error::{DataErrorKind, MoneyWiseError, MoneyWiseResult};
use crate::report::ChangeRow;
use crate::security::{ControlData, ControlKey, DataKey, KeyRing};
use crate::storage::DataSetSnapshot;

/// Number of items between progress reports during security updates
pub const DEFAULT_PROGRESS_INTERVAL: usize = 50;

/// Lifecycle hooks binding an info list to its owner list
#[derive(Clone, Copy)]
struct OwnedInfo {
    owner_type: &'static str,
    info_type: &'static str,
    unlink: fn(&mut DataSet, u32) -> MoneyWiseResult<usize>,
    duplicate: fn(&mut DataSet, u32, u32) -> MoneyWiseResult<usize>,
}

impl fmt::Debug for OwnedInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedInfo")
            .field("owner_type", &self.owner_type)
            .field("info_type", &self.info_type)
            .finish_non_exhaustive()
    }
}

fn unlink_infos<I: InfoValues>(set: &mut DataSet, owner: u32) -> MoneyWiseResult<usize> {
    let list = set.list_mut::<I>()?;
    Ok(DataInfoSet::<I>::new(owner).unlink_owner(list))
}

fn duplicate_infos<I: InfoValues>(set: &mut DataSet, owner: u32, copy: u32) -> MoneyWiseResult<usize> {
    let list = set.list_mut::<I>()?;
    let infos = DataInfoSet::<I>::build(owner, list)?;
    Ok(infos.duplicate(copy, list)?.len())
}

#[derive(Debug)]
pub struct DataSet {
    style: ListStyle,
    generation: u32,
    version: u32,
    control_keys: DataList<ControlKey>,
    data_keys: DataList<DataKey>,
    control_data: DataList<ControlData>,
    lists: Vec<Box<dyn ListOps>>,
    owned_infos: Vec<OwnedInfo>,
    key_ring: KeyRing,
    progress_interval: usize,
}

impl DataSet {
    pub fn new(style: ListStyle) -> Self {
        Self {
            style,
            generation: 0,
            version: 0,
            control_keys: DataList::new(style),
            data_keys: DataList::new(style),
            control_data: DataList::new(style),
            lists: Vec::new(),
            owned_infos: Vec::new(),
            key_ring: KeyRing::new(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// An empty set with the same registry shape, counters and keys
    fn empty_like(&self, style: ListStyle) -> Self {
        Self {
            style,
            generation: self.generation,
            version: self.version,
            control_keys: DataList::new(style),
            data_keys: DataList::new(style),
            control_data: DataList::new(style),
            lists: Vec::with_capacity(self.lists.len()),
            owned_infos: self.owned_infos.clone(),
            key_ring: self.key_ring.clone(),
            progress_interval: self.progress_interval,
        }
    }

    /// Register an empty list for an entity type
    ///
    /// Lists are kept in registration order, which must put link targets
    /// before the lists that refer to them. Returns false if the entity is
    /// already registered.
    pub fn register<V: DataValues>(&mut self) -> bool {
        if self.lists().any(|list| list.as_any().is::<DataList<V>>()) {
            return false;
        }
        let mut list = DataList::<V>::new(self.style);
        list.set_generation(self.generation);
        list.set_version(self.version);
        self.lists.push(Box::new(list));
        true
    }

    /// Register an info list whose entries live and die with their owner
    ///
    /// Unlinking or duplicating an owner through [`DataSet::unlink_item`]
    /// and [`DataSet::duplicate_item`] carries its info entries along.
    pub fn register_info<I: InfoValues>(&mut self) -> bool {
        if !self.register::<I>() {
            return false;
        }
        self.owned_infos.push(OwnedInfo {
            owner_type: I::OWNER_TYPE,
            info_type: I::ITEM_TYPE,
            unlink: unlink_infos::<I>,
            duplicate: duplicate_infos::<I>,
        });
        true
    }

    fn infos_owned_by(&self, owner_type: &str) -> Vec<OwnedInfo> {
        self.owned_infos
            .iter()
            .filter(|info| info.owner_type == owner_type)
            .copied()
            .collect()
    }

    pub fn style(&self) -> ListStyle {
        self.style
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn progress_interval(&self) -> usize {
        self.progress_interval
    }

    pub fn set_progress_interval(&mut self, interval: usize) {
        self.progress_interval = interval;
    }

    /// Every list, security lists first
    pub fn lists(&self) -> impl Iterator<Item = &(dyn ListOps + 'static)> {
        let security: [&(dyn ListOps + 'static); 3] =
            [&self.control_keys, &self.data_keys, &self.control_data];
        security.into_iter().chain(self.lists.iter().map(|list| &**list))
    }

    pub fn lists_mut(&mut self) -> impl Iterator<Item = &mut (dyn ListOps + 'static)> {
        let security: [&mut (dyn ListOps + 'static); 3] = [
            &mut self.control_keys,
            &mut self.data_keys,
            &mut self.control_data,
        ];
        security
            .into_iter()
            .chain(self.lists.iter_mut().map(|list| &mut **list))
    }

    pub fn list<V: DataValues>(&self) -> MoneyWiseResult<&DataList<V>> {
        self.lists()
            .find_map(|list| list.as_any().downcast_ref::<DataList<V>>())
            .ok_or_else(|| missing_list::<V>())
    }

    pub fn list_mut<V: DataValues>(&mut self) -> MoneyWiseResult<&mut DataList<V>> {
        self.lists_mut()
            .find_map(|list| list.as_any_mut().downcast_mut::<DataList<V>>())
            .ok_or_else(|| missing_list::<V>())
    }

    /// Borrow one list mutably alongside another read-only
    pub fn list_with<A: DataValues, B: DataValues>(
        &mut self,
    ) -> MoneyWiseResult<(&mut DataList<A>, &DataList<B>)> {
        let mut first = None;
        let mut second = None;
        for list in self.lists_mut() {
            if first.is_none() && list.as_any().is::<DataList<A>>() {
                first = list.as_any_mut().downcast_mut::<DataList<A>>();
            } else if second.is_none() && list.as_any().is::<DataList<B>>() {
                second = list.as_any().downcast_ref::<DataList<B>>();
            }
        }
        match (first, second) {
            (Some(a), Some(b)) => Ok((a, b)),
            (None, _) => Err(missing_list::<A>()),
            (_, None) => Err(missing_list::<B>()),
        }
    }

    /// Remove an item along with the info entries it owns
    pub fn unlink_item<V: DataValues>(&mut self, id: u32) -> MoneyWiseResult<DataItem<V>> {
        let item = self
            .list_mut::<V>()?
            .unlink(id)
            .ok_or_else(|| MoneyWiseError::not_found(V::ITEM_TYPE, id))?;

        for info in self.infos_owned_by(V::ITEM_TYPE) {
            let removed = (info.unlink)(self, id)?;
            debug!(owner = id, info = info.info_type, removed, "Unlinked owned info");
        }
        Ok(item)
    }

    /// Add a new copy of an item, duplicating the info entries it owns
    ///
    /// Returns the id of the copy.
    pub fn duplicate_item<V: DataValues>(&mut self, id: u32) -> MoneyWiseResult<u32> {
        let values = self.list::<V>()?.item(id)?.values().clone();
        let copy = self.list_mut::<V>()?.add_new_item(values)?;

        for info in self.infos_owned_by(V::ITEM_TYPE) {
            let copied = (info.duplicate)(self, id, copy)?;
            debug!(owner = id, copy, info = info.info_type, copied, "Duplicated owned info");
        }
        Ok(copy)
    }

    pub fn control_keys(&self) -> &DataList<ControlKey> {
        &self.control_keys
    }

    pub fn data_keys(&self) -> &DataList<DataKey> {
        &self.data_keys
    }

    pub fn control_data(&self) -> &DataList<ControlData> {
        &self.control_data
    }

    /// Row-level access for readers restoring the control record
    pub fn control_data_mut(&mut self) -> &mut DataList<ControlData> {
        &mut self.control_data
    }

    pub fn set_generation(&mut self, generation: u32) {
        self.generation = generation;
        for list in self.lists_mut() {
            list.set_generation(generation);
        }
    }

    pub fn set_version(&mut self, version: u32) {
        self.version = version;
        for list in self.lists_mut() {
            list.set_version(version);
        }
    }

    /// Undo every change after `version` across all lists
    pub fn rewind_to_version(&mut self, version: u32) -> EditState {
        let removed: usize = self
            .lists_mut()
            .map(|list| list.rewind_to_version(version).len())
            .sum();
        self.version = version;
        debug!(version, removed, "Rewound data set");
        self.validate()
    }

    fn derive(&self, style: ListStyle) -> MoneyWiseResult<Self> {
        let mut set = self.empty_like(style);
        set.control_keys = self.control_keys.derive_list(style)?;
        set.data_keys = self.data_keys.derive_list(style)?;
        set.control_data = self.control_data.derive_list(style)?;
        for list in &self.lists {
            set.lists.push(list.derive_boxed(style)?);
        }
        Ok(set)
    }

    /// Deep copy of the set with links re-resolved
    pub fn derive_clone(&self) -> MoneyWiseResult<Self> {
        let mut set = self.derive(ListStyle::Clone)?;
        set.resolve_links();
        Ok(set)
    }

    /// The pending changes of every list
    pub fn derive_update_set(&self) -> MoneyWiseResult<Self> {
        self.derive(ListStyle::Update)
    }

    /// Difference of two sets of the same shape
    ///
    /// On failure the partially built set is dropped.
    pub fn derive_differences(new: &DataSet, old: &DataSet) -> MoneyWiseResult<Self> {
        check_same_shape(new, old)?;
        let mut set = new.empty_like(ListStyle::Differ);
        set.control_keys = new.control_keys.derive_differences(&old.control_keys)?;
        set.data_keys = new.data_keys.derive_differences(&old.data_keys)?;
        set.control_data = new.control_data.derive_differences(&old.control_data)?;
        for (list, previous) in new.lists.iter().zip(&old.lists) {
            set.lists.push(list.derive_differences_boxed(previous.as_ref())?);
        }
        debug!(lists = set.lists.len(), "Derived data set differences");
        Ok(set)
    }

    /// Rewrite every list's history relative to `old`
    ///
    /// A failure part way through leaves the set inconsistent; discard it.
    pub fn re_base(&mut self, old: &DataSet) -> MoneyWiseResult<()> {
        check_same_shape(self, old)?;
        self.control_keys.re_base(&old.control_keys)?;
        self.data_keys.re_base(&old.data_keys)?;
        self.control_data.re_base(&old.control_data)?;
        for (list, base) in self.lists.iter_mut().zip(&old.lists) {
            list.re_base_boxed(base.as_ref())?;
        }
        self.set_version(self.version + 1);
        Ok(())
    }

    /// Check every link field against its target list
    ///
    /// Live targets are marked active. Links to missing or deleted items
    /// are recorded as `InvalidLink` errors on the source item, replacing
    /// those of any earlier pass. Returns the number of broken links.
    pub fn resolve_links(&mut self) -> usize {
        for list in self.lists_mut() {
            list.clear_active();
            list.clear_link_errors();
        }

        let links: Vec<(usize, LinkRef)> = self
            .lists()
            .enumerate()
            .flat_map(|(source, list)| list.links().into_iter().map(move |link| (source, link)))
            .collect();

        let mut broken = Vec::new();
        for (source, link) in links {
            match self.lists_mut().find(|list| list.item_type() == link.target) {
                Some(target) if target.contains_live_id(link.target_id) => {
                    target.touch_item(link.target_id);
                }
                _ => broken.push((source, link)),
            }
        }

        for (source, link) in &broken {
            warn!(
                item = link.item_id,
                field = link.field,
                target = link.target,
                target_id = link.target_id,
                "Unresolved link"
            );
            if let Some(list) = self.lists_mut().nth(*source) {
                list.record_error(
                    link.item_id,
                    link.field,
                    DataErrorKind::InvalidLink,
                    format!("{} {} does not exist", link.target, link.target_id),
                );
            }
        }

        for list in self.lists_mut() {
            list.find_edit_state();
        }
        broken.len()
    }

    /// Validate every list, then the links between them
    pub fn validate(&mut self) -> EditState {
        for list in self.lists_mut() {
            list.validate();
        }
        self.resolve_links();
        self.edit_state()
    }

    /// Combined edit state: Error, then Dirty, then Valid, then Clean
    pub fn edit_state(&self) -> EditState {
        self.lists()
            .map(|list| list.edit_state())
            .max_by_key(|state| match state {
                EditState::Clean => 0,
                EditState::Valid => 1,
                EditState::Dirty => 2,
                EditState::Error => 3,
            })
            .unwrap_or_default()
    }

    pub fn has_updates(&self) -> bool {
        self.lists().any(|list| list.has_updates())
    }

    /// Fold every change into the base state after a save
    pub fn commit(&mut self) {
        for list in self.lists_mut() {
            list.commit();
        }
        self.version = 0;
    }

    pub fn change_rows(&self) -> Vec<ChangeRow> {
        self.lists().flat_map(|list| list.change_rows()).collect()
    }

    pub fn key_ring(&self) -> &KeyRing {
        &self.key_ring
    }

    /// Id of the control key the control record points at
    pub fn current_control_key(&self) -> Option<u32> {
        self.control_data
            .control()
            .map(|record| record.values().control_key)
    }

    /// Create a control key and its wrapped data key, unlocking the data key
    fn create_key_set(
        &mut self,
        passphrase: &str,
        settings: &SecuritySettings,
    ) -> MoneyWiseResult<u32> {
        let (control_key, pass_key) = ControlKey::create(passphrase, settings)?;
        let id = self.control_keys.add_new_item(control_key)?;

        let data_key = DerivedKey::generate();
        self.data_keys
            .add_new_item(DataKey::wrap(id, &data_key, &pass_key)?)?;
        self.key_ring.insert(id, data_key);

        info!(control_key = id, "Created key set");
        Ok(id)
    }

    /// Create the first key set and control record, then encrypt all data
    pub fn initialise_security(
        &mut self,
        passphrase: &str,
        settings: &SecuritySettings,
    ) -> MoneyWiseResult<u32> {
        if self.control_keys.live_items().next().is_some() {
            return Err(MoneyWiseError::IllegalState(
                "Security is already initialised".to_string(),
            ));
        }

        let id = self.create_key_set(passphrase, settings)?;
        self.control_data.add_open_item(0, ControlData::new(id))?;
        self.seal()?;
        info!(control_key = id, "Initialised security");
        Ok(id)
    }

    /// Unlock every control key with the passphrase and decrypt all data
    pub fn unlock_security(&mut self, passphrase: &str) -> MoneyWiseResult<()> {
        let mut ring = KeyRing::new();
        for control_key in self.control_keys.live_items() {
            let pass_key = control_key.values().unlock(passphrase)?;
            for data_key in self
                .data_keys
                .live_items()
                .filter(|key| key.values().control_key == control_key.id())
            {
                ring.insert(control_key.id(), data_key.values().unwrap_key(&pass_key)?);
            }
        }
        self.key_ring = ring;

        for list in self.lists.iter_mut().filter(|list| list.is_encrypted()) {
            list.unlock(&self.key_ring)?;
        }
        info!(keys = self.key_ring.len(), "Unlocked security");
        Ok(())
    }

    /// Encrypt every value that has no ciphertext yet
    pub fn seal(&mut self) -> MoneyWiseResult<()> {
        let Some(control_key) = self.current_control_key() else {
            if self
                .lists
                .iter()
                .any(|list| list.is_encrypted() && !list.is_empty())
            {
                return Err(MoneyWiseError::IllegalState(
                    "Encrypted data present but security is not initialised".to_string(),
                ));
            }
            return Ok(());
        };

        for list in self.lists.iter_mut().filter(|list| list.is_encrypted()) {
            list.seal(&self.key_ring, control_key)?;
        }
        Ok(())
    }

    /// Repair a partially renewed key set
    ///
    /// Returns true if more than one control key or control record was
    /// found and security was updated.
    pub fn check_security(&mut self, task: &mut dyn TaskControl) -> MoneyWiseResult<bool> {
        let keys = self.control_keys.live_items().count();
        let records = self.control_data.live_items().count();
        if keys <= 1 && records <= 1 {
            return Ok(false);
        }

        warn!(keys, records, "Inconsistent security records, updating security");
        self.update_security(task)?;
        Ok(true)
    }

    /// Re-encrypt every encrypted list under the current control key
    ///
    /// Each list is a separate stage of `task`. Once every list is done the
    /// superseded keys and control records are removed.
    pub fn update_security(&mut self, task: &mut dyn TaskControl) -> MoneyWiseResult<usize> {
        let target = self.current_control_key().ok_or_else(|| {
            MoneyWiseError::IllegalState("No control record to update security from".to_string())
        })?;

        info!(control_key = target, "Updating security");
        let mut updated = 0;
        for list in self.lists.iter_mut().filter(|list| list.is_encrypted()) {
            updated += list.update_security(&self.key_ring, target, task, self.progress_interval)?;
        }

        self.purge_security(target);
        info!(control_key = target, updated, "Security updated");
        Ok(updated)
    }

    fn purge_security(&mut self, target: u32) {
        let current = self.control_data.control().map(|record| record.id());
        let stale_records: Vec<u32> = self
            .control_data
            .ids()
            .into_iter()
            .filter(|&id| Some(id) != current)
            .collect();
        self.control_data.unlink_all(&stale_records);

        let stale_keys: Vec<u32> = self
            .control_keys
            .ids()
            .into_iter()
            .filter(|&id| id != target)
            .collect();
        let stale_data_keys: Vec<u32> = self
            .data_keys
            .iter()
            .filter(|key| key.values().control_key != target)
            .map(|key| key.id())
            .collect();

        self.control_keys.unlink_all(&stale_keys);
        self.data_keys.unlink_all(&stale_data_keys);
        self.key_ring.retain(&[target]);

        if !stale_keys.is_empty() {
            info!(removed = ?stale_keys, "Purged superseded control keys");
        }
    }

    /// Rotate to a fresh control key protected by the same passphrase
    pub fn renew_security(
        &mut self,
        passphrase: &str,
        settings: &SecuritySettings,
        task: &mut dyn TaskControl,
    ) -> MoneyWiseResult<u32> {
        let current = self.current_control_key().ok_or_else(|| {
            MoneyWiseError::IllegalState("Security is not initialised".to_string())
        })?;
        self.control_keys.item(current)?.values().unlock(passphrase)?;

        let id = self.create_key_set(passphrase, settings)?;
        self.control_data.add_new_item(ControlData::new(id))?;
        self.update_security(task)?;
        info!(previous = current, control_key = id, "Renewed security");
        Ok(id)
    }

    pub fn to_snapshot(&self) -> MoneyWiseResult<DataSetSnapshot> {
        Ok(DataSetSnapshot {
            saved_at: Utc::now(),
            generation: self.generation,
            lists: self
                .lists()
                .map(|list| list.to_snapshot())
                .collect::<MoneyWiseResult<Vec<_>>>()?,
        })
    }

    /// Load stored rows into the matching lists
    pub fn load_snapshot(&mut self, snapshot: &DataSetSnapshot) -> MoneyWiseResult<()> {
        for stored in &snapshot.lists {
            let list = self
                .lists_mut()
                .find(|list| list.item_type() == stored.item_type)
                .ok_or_else(|| {
                    MoneyWiseError::Storage(format!("Unknown list type '{}'", stored.item_type))
                })?;
            list.load_snapshot(stored)?;
        }
        self.set_generation(snapshot.generation);
        debug!(lists = snapshot.lists.len(), "Loaded data set snapshot");
        Ok(())
    }
}

fn missing_list<V: DataValues>() -> MoneyWiseError {
    MoneyWiseError::IllegalState(format!("No {} list in data set", V::LIST_NAME))
}

fn check_same_shape(new: &DataSet, old: &DataSet) -> MoneyWiseResult<()> {
    if new.lists.len() != old.lists.len() {
        return Err(MoneyWiseError::IllegalState(format!(
            "Data sets differ in shape: {} lists against {}",
            new.lists.len(),
            old.lists.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::Note;
    use crate::data::static_data::StaticClass;
    use crate::data::{DataInfoSet, DataState};
    use crate::models::{
        self, Account, AccountCategoryClass, Currency, CurrencyClass, Money, Transaction,
        TransactionInfo, TransactionInfoClass, TransactionInfoType,
    };
    use chrono::NaiveDate;

    struct CancelAt(&'static str);

    impl TaskControl for CancelAt {
        fn set_new_stage(&mut self, stage: &str) -> bool {
            stage != self.0
        }

        fn set_num_steps(&mut self, _steps: usize) -> bool {
            true
        }

        fn set_steps_done(&mut self, _done: usize) -> bool {
            true
        }

        fn new_data_set(&self) -> DataSet {
            models::new_data_set()
        }
    }

    fn light() -> SecuritySettings {
        SecuritySettings {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }

    fn populated() -> DataSet {
        let mut set = models::new_data_set();
        models::populate_static_data(&mut set).unwrap();
        set
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut set = DataSet::new(ListStyle::Core);
        assert!(set.register::<Note>());
        assert!(!set.register::<Note>());
        assert_eq!(set.lists().count(), 4);
    }

    #[test]
    fn test_missing_list_is_illegal_state() {
        let set = DataSet::new(ListStyle::Core);
        let err = set.list::<Note>().unwrap_err();
        assert!(matches!(err, MoneyWiseError::IllegalState(_)));
    }

    #[test]
    fn test_info_set_over_borrowed_lists() {
        let mut set = populated();
        let (infos, types) = set
            .list_with::<TransactionInfo, TransactionInfoType>()
            .unwrap();
        let mut info = DataInfoSet::<TransactionInfo>::new(1);
        info.set_value(TransactionInfoClass::Reference, Some("INV-7".into()), infos, types)
            .unwrap();
        assert_eq!(
            info.get_value(TransactionInfoClass::Reference, infos)
                .map(String::as_str),
            Some("INV-7")
        );

        // No transaction 1 exists yet
        assert_eq!(set.resolve_links(), 1);
    }

    fn account(name: &str) -> Account {
        Account::new(name, AccountCategoryClass::Checking, CurrencyClass::Gbp)
    }

    /// Two accounts and transaction 1 between them carrying a reference
    fn with_referenced_transaction() -> DataSet {
        let mut set = populated();
        let accounts = set.list_mut::<Account>().unwrap();
        accounts.add_values_item(0, account("Current")).unwrap();
        accounts.add_values_item(0, account("Savings")).unwrap();
        set.list_mut::<Transaction>()
            .unwrap()
            .add_values_item(
                0,
                Transaction::new(
                    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                    1,
                    2,
                    Money::from_minor(1250),
                ),
            )
            .unwrap();

        let (infos, types) = set
            .list_with::<TransactionInfo, TransactionInfoType>()
            .unwrap();
        DataInfoSet::<TransactionInfo>::new(1)
            .set_value(TransactionInfoClass::Reference, Some("INV-7".into()), infos, types)
            .unwrap();
        set
    }

    #[test]
    fn test_unlink_owner_removes_its_info() {
        let mut set = with_referenced_transaction();
        assert_eq!(set.resolve_links(), 0);

        let removed = set.unlink_item::<Transaction>(1).unwrap();
        assert_eq!(removed.id(), 1);
        assert!(set.list::<Transaction>().unwrap().is_empty());
        assert!(set.list::<TransactionInfo>().unwrap().is_empty());
        assert_eq!(set.resolve_links(), 0);

        let err = set.unlink_item::<Transaction>(1).unwrap_err();
        assert_eq!(err.data_kind(), Some(DataErrorKind::NotFound));
    }

    #[test]
    fn test_duplicate_owner_copies_its_info() {
        let mut set = with_referenced_transaction();

        let copy = set.duplicate_item::<Transaction>(1).unwrap();
        assert_eq!(copy, 2);
        assert_eq!(
            set.list::<Transaction>().unwrap().item(copy).unwrap().state(),
            DataState::New
        );

        let infos = set.list::<TransactionInfo>().unwrap();
        assert_eq!(infos.len(), 2);
        let copied = DataInfoSet::<TransactionInfo>::build(copy, infos).unwrap();
        assert_eq!(
            copied
                .get_value(TransactionInfoClass::Reference, infos)
                .map(String::as_str),
            Some("INV-7")
        );
        assert_eq!(DataInfoSet::<TransactionInfo>::build(1, infos).unwrap().len(), 1);
        assert_eq!(set.resolve_links(), 0);
    }

    #[test]
    fn test_re_base_moves_every_list_to_next_version() {
        let mut old = populated();
        {
            let accounts = old.list_mut::<Account>().unwrap();
            accounts.add_values_item(0, account("Current")).unwrap();
            accounts.add_values_item(0, account("Savings")).unwrap();
        }

        let mut set = populated();
        {
            let accounts = set.list_mut::<Account>().unwrap();
            accounts.add_values_item(0, account("Current")).unwrap();
            accounts.add_values_item(0, account("Savings Plus")).unwrap();
            accounts.add_values_item(0, account("Wallet")).unwrap();
        }

        set.re_base(&old).unwrap();
        assert_eq!(set.version(), 1);
        assert!(set.lists().all(|list| list.version() == 1));
        let accounts = set.list::<Account>().unwrap();
        assert_eq!(accounts.item(1).unwrap().state(), DataState::Clean);
        assert_eq!(accounts.item(2).unwrap().state(), DataState::Changed);
        assert_eq!(accounts.item(3).unwrap().state(), DataState::New);

        {
            let accounts = set.list_mut::<Account>().unwrap();
            accounts.push_history(1).unwrap();
            let item = accounts.item_mut(1).unwrap();
            item.values_mut().closed = true;
            assert!(item.check_for_history());
            assert_eq!(item.version(), 2);
        }

        set.rewind_to_version(set.version());
        let accounts = set.list::<Account>().unwrap();
        assert!(!accounts.item(1).unwrap().values().closed);
        assert_eq!(accounts.item(1).unwrap().state(), DataState::Clean);
        assert_eq!(accounts.item(2).unwrap().state(), DataState::Changed);
        assert_eq!(accounts.item(3).unwrap().state(), DataState::New);
    }

    #[test]
    fn test_resolve_links_replaces_earlier_link_errors() {
        let mut set = populated();
        let gbp = CurrencyClass::Gbp.class_id();
        set.list_mut::<Account>()
            .unwrap()
            .add_values_item(0, account("Current"))
            .unwrap();
        set.list_mut::<Currency>().unwrap().delete_item(gbp).unwrap();

        assert_eq!(set.resolve_links(), 1);
        assert_eq!(set.resolve_links(), 1);
        let errors = set.list::<Account>().unwrap().item(1).unwrap().errors().errors().len();
        assert_eq!(errors, 1);

        set.list_mut::<Currency>()
            .unwrap()
            .item_mut(gbp)
            .unwrap()
            .set_deleted(false, 0);
        assert_eq!(set.resolve_links(), 0);
        let account = set.list::<Account>().unwrap().item(1).unwrap();
        assert!(!account.errors().has_errors());
        assert_ne!(account.edit_state(), EditState::Error);
    }

    #[test]
    fn test_broken_link_recorded_on_source() {
        let mut set = populated();
        set.list_mut::<Account>()
            .unwrap()
            .add_values_item(
                0,
                Account::new("Current", AccountCategoryClass::Checking, CurrencyClass::Gbp),
            )
            .unwrap();
        set.list_mut::<Currency>()
            .unwrap()
            .delete_item(CurrencyClass::Gbp.class_id())
            .unwrap();

        assert_eq!(set.resolve_links(), 1);
        let account = set.list::<Account>().unwrap().item(1).unwrap();
        assert_eq!(
            account.errors().field_error_kind("Currency"),
            Some(DataErrorKind::InvalidLink)
        );
        assert_eq!(set.edit_state(), EditState::Error);
    }

    #[test]
    fn test_resolve_links_marks_targets_active() {
        let mut set = populated();
        set.list_mut::<Account>()
            .unwrap()
            .add_values_item(
                0,
                Account::new("Savings", AccountCategoryClass::Savings, CurrencyClass::Eur),
            )
            .unwrap();

        assert_eq!(set.resolve_links(), 0);
        let currencies = set.list::<Currency>().unwrap();
        assert!(currencies.item(CurrencyClass::Eur.class_id()).unwrap().is_active());
        assert!(!currencies.item(CurrencyClass::Usd.class_id()).unwrap().is_active());
    }

    #[test]
    fn test_update_set_holds_only_changes() {
        let mut set = populated();
        set.commit();
        set.set_version(1);
        set.list_mut::<Account>()
            .unwrap()
            .add_new_item(Account::new(
                "Wallet",
                AccountCategoryClass::Cash,
                CurrencyClass::Gbp,
            ))
            .unwrap();

        let update = set.derive_update_set().unwrap();
        assert_eq!(update.style(), ListStyle::Update);
        assert_eq!(update.list::<Currency>().unwrap().len(), 0);
        let accounts = update.list::<Account>().unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts.item(1).unwrap().state(), DataState::New);
    }

    #[test]
    fn test_differences_require_same_shape() {
        let set = populated();
        let other = DataSet::new(ListStyle::Core);
        let err = DataSet::derive_differences(&set, &other).unwrap_err();
        assert!(matches!(err, MoneyWiseError::IllegalState(_)));
    }

    #[test]
    fn test_seal_without_security_fails_when_data_present() {
        let mut set = populated();
        assert!(set.seal().is_ok());
        set.list_mut::<Account>()
            .unwrap()
            .add_values_item(
                0,
                Account::new("Current", AccountCategoryClass::Checking, CurrencyClass::Gbp),
            )
            .unwrap();
        assert!(matches!(set.seal(), Err(MoneyWiseError::IllegalState(_))));
    }

    #[test]
    fn test_initialise_twice_fails() {
        let mut set = populated();
        set.initialise_security("secret", &light()).unwrap();
        assert!(set.initialise_security("secret", &light()).is_err());
    }

    #[test]
    fn test_cancelled_renew_heals_on_check() {
        let mut set = populated();
        set.list_mut::<Account>()
            .unwrap()
            .add_values_item(
                0,
                Account::new("Current", AccountCategoryClass::Checking, CurrencyClass::Gbp),
            )
            .unwrap();
        let first = set.initialise_security("secret", &light()).unwrap();

        let mut cancel = CancelAt(Account::LIST_NAME);
        let err = set.renew_security("secret", &light(), &mut cancel).unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(set.control_keys().len(), 2);
        assert_eq!(set.control_data().len(), 2);

        let mut task = CancelAt("");
        assert!(set.check_security(&mut task).unwrap());
        let current = set.current_control_key().unwrap();
        assert_ne!(current, first);
        assert_eq!(set.control_keys().ids(), vec![current]);
        assert_eq!(set.control_data().len(), 1);
        assert_eq!(set.data_keys().len(), 1);

        let account = set.list::<Account>().unwrap().item(1).unwrap();
        assert_eq!(account.values().control_key, current);
        assert_eq!(account.values().name(), Some("Current"));
        assert!(!set.check_security(&mut task).unwrap());
    }

    #[test]
    fn test_renew_rejects_wrong_passphrase() {
        let mut set = populated();
        set.initialise_security("secret", &light()).unwrap();
        let mut task = CancelAt("");
        assert!(set.renew_security("guess", &light(), &mut task).is_err());
        assert_eq!(set.control_keys().len(), 1);
    }
}
