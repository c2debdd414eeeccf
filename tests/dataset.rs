//! Data set lifecycle tests

use chrono::NaiveDate;
use tempfile::TempDir;

use moneywise::config::SecuritySettings;
use moneywise::data::{
    DataList, DataSet, DataState, EditState, ListStyle, RewindOutcome, StaticClass, TaskControl,
};
use moneywise::error::DataErrorKind;
use moneywise::models::{
    self, Account, AccountCategoryClass, Currency, CurrencyClass, Money, Transaction,
};
use moneywise::security::ControlData;
use moneywise::storage::{load_data_set, save_data_set};

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

fn account(name: &str) -> Account {
    Account::new(name, AccountCategoryClass::Checking, CurrencyClass::Gbp)
}

/// Cancels when it reaches the named stage
struct StopAt(&'static str);

impl TaskControl for StopAt {
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

#[test]
fn test_edit_bumps_version_and_pop_restores() {
    let mut list: DataList<Account> = DataList::new(ListStyle::Core);
    let id = list.add_values_item(0, account("Current")).unwrap();
    assert_eq!(list.item(id).unwrap().state(), DataState::Clean);

    list.push_history(id).unwrap();
    let item = list.item_mut(id).unwrap();
    item.values_mut().name.set(Some("Joint".to_string()));
    assert!(item.check_for_history());
    assert_eq!(item.version(), 1);
    assert_eq!(item.state(), DataState::Changed);

    let changed: Vec<_> = item.changed_fields().into_iter().map(|c| c.0).collect();
    assert_eq!(changed, vec!["Name"]);

    assert!(item.pop_history());
    assert_eq!(item.state(), DataState::Clean);
    assert_eq!(item.values().name(), Some("Current"));
}

#[test]
fn test_edit_list_change_rewinds_to_original() {
    let mut core: DataList<Account> = DataList::new(ListStyle::Core);
    core.add_values_item(0, account("Current")).unwrap();

    let mut edit = core.derive_list(ListStyle::Edit).unwrap();
    edit.push_history(1).unwrap();
    let item = edit.item_mut(1).unwrap();
    item.values_mut().name.set(Some("Joint".to_string()));
    assert!(item.check_for_history());
    assert_eq!(item.version(), 1);
    assert_eq!(item.base(), Some(1));

    assert_eq!(item.rewind_to_version(0), RewindOutcome::Rewound);
    assert_eq!(item.values().name(), Some("Current"));
    assert_eq!(item.state(), DataState::Clean);
}

#[test]
fn test_clone_keeps_states_and_yields_same_update() {
    let mut list: DataList<Account> = DataList::new(ListStyle::Core);
    list.add_values_item(0, account("Current")).unwrap();
    list.add_values_item(0, account("Savings")).unwrap();
    list.add_values_item(0, account("Wallet")).unwrap();
    let mut snapshot = list.derive_list(ListStyle::Clone).unwrap();

    list.push_history(1).unwrap();
    list.item_mut(1).unwrap().values_mut().closed = true;
    assert!(list.item_mut(1).unwrap().check_for_history());
    list.delete_item(2).unwrap();
    list.add_new_item(account("Holiday")).unwrap();

    let clone = list.derive_list(ListStyle::Clone).unwrap();
    for item in list.iter() {
        assert_eq!(clone.item(item.id()).unwrap().state(), item.state());
    }

    let update = clone.derive_list(ListStyle::Update).unwrap();
    let states: Vec<_> = update.iter().map(|i| (i.id(), i.state())).collect();
    assert_eq!(
        states,
        vec![
            (1, DataState::Changed),
            (2, DataState::Deleted),
            (4, DataState::New),
        ]
    );

    snapshot.apply_update(&update).unwrap();
    assert!(snapshot.item(1).unwrap().values().closed);
    assert!(snapshot.item(2).unwrap().is_deleted());
    assert_eq!(snapshot.item(4).unwrap().values().name(), Some("Holiday"));
}

#[test]
fn test_update_list_replays_onto_snapshot() {
    let mut list: DataList<Account> = DataList::new(ListStyle::Core);
    list.add_values_item(0, account("Current")).unwrap();
    list.add_values_item(0, account("Savings")).unwrap();
    let mut snapshot = list.derive_list(ListStyle::Clone).unwrap();

    list.push_history(1).unwrap();
    list.item_mut(1).unwrap().values_mut().closed = true;
    list.item_mut(1).unwrap().check_for_history();
    list.add_new_item(account("Holiday")).unwrap();
    list.delete_item(2).unwrap();

    let update = list.derive_list(ListStyle::Update).unwrap();
    assert_eq!(update.len(), 3);
    snapshot.apply_update(&update).unwrap();

    let live: Vec<_> = list.live_items().map(|i| (i.id(), i.values().clone())).collect();
    let replayed: Vec<_> = snapshot
        .live_items()
        .map(|i| (i.id(), i.values().clone()))
        .collect();
    assert_eq!(replayed.len(), live.len());
    for (id, values) in live {
        assert!(replayed.contains(&(id, values)));
    }
}

#[test]
fn test_differences_cover_every_id() {
    let mut old = populated();
    {
        let accounts = old.list_mut::<Account>().unwrap();
        accounts.add_values_item(1, account("Kept")).unwrap();
        accounts.add_values_item(2, account("Renamed")).unwrap();
        accounts.add_values_item(3, account("Removed")).unwrap();
    }

    let mut new = populated();
    {
        let accounts = new.list_mut::<Account>().unwrap();
        accounts.add_values_item(1, account("Kept")).unwrap();
        accounts.add_values_item(2, account("Renamed Again")).unwrap();
        accounts.add_values_item(4, account("Added")).unwrap();
    }

    let differences = DataSet::derive_differences(&new, &old).unwrap();
    let accounts = differences.list::<Account>().unwrap();
    assert_eq!(accounts.style(), ListStyle::Differ);

    let mut states: Vec<_> = accounts.iter().map(|i| (i.id(), i.state())).collect();
    states.sort_by_key(|(id, _)| *id);
    assert_eq!(
        states,
        vec![
            (1, DataState::Clean),
            (2, DataState::Changed),
            (3, DataState::Deleted),
            (4, DataState::New),
        ]
    );

    let rows = differences.change_rows();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().any(|r| r.id == 2 && r.summary.contains("Renamed Again")));
}

#[test]
fn test_rewind_removes_later_items_and_is_idempotent() {
    let mut set = populated();
    set.list_mut::<Account>()
        .unwrap()
        .add_values_item(0, account("Current"))
        .unwrap();
    set.commit();

    set.set_version(1);
    {
        let accounts = set.list_mut::<Account>().unwrap();
        accounts.add_new_item(account("Later")).unwrap();
        accounts.push_history(1).unwrap();
        accounts.item_mut(1).unwrap().values_mut().closed = true;
    }
    set.list_mut::<Transaction>()
        .unwrap()
        .add_new_item(Transaction::new(
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            1,
            2,
            Money::from_minor(2500),
        ))
        .unwrap();

    assert_eq!(set.rewind_to_version(0), EditState::Clean);
    let accounts = set.list::<Account>().unwrap();
    assert_eq!(accounts.ids(), vec![1]);
    assert!(!accounts.item(1).unwrap().values().closed);
    assert!(set.list::<Transaction>().unwrap().is_empty());

    assert_eq!(set.rewind_to_version(0), EditState::Clean);
    assert_eq!(set.list::<Account>().unwrap().ids(), vec![1]);
}

#[test]
fn test_static_duplicates_flag_both_items() {
    let mut set = populated();
    let gbp = CurrencyClass::Gbp.class_id();
    let usd = CurrencyClass::Usd.class_id();
    {
        let currencies = set.list_mut::<Currency>().unwrap();
        currencies.push_history(usd).unwrap();
        currencies.item_mut(usd).unwrap().values_mut().name = "GBP".to_string();
    }

    assert_eq!(set.validate(), EditState::Error);
    let currencies = set.list::<Currency>().unwrap();
    for id in [gbp, usd] {
        assert_eq!(
            currencies.item(id).unwrap().errors().field_error_kind("Name"),
            Some(DataErrorKind::DuplicateValue)
        );
    }
}

#[test]
fn test_control_record_is_singleton() {
    let mut set = populated();
    set.initialise_security("correct horse", &light()).unwrap();

    let err = set
        .control_data_mut()
        .add_open_item(0, ControlData::new(1))
        .unwrap_err();
    assert_eq!(err.data_kind(), Some(DataErrorKind::ControlRecordExists));
    assert!(err.to_string().contains("Control record already exists"));
}

#[test]
fn test_interrupted_renewal_heals_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("moneywise.json");

    let mut set = populated();
    set.list_mut::<Account>()
        .unwrap()
        .add_values_item(0, account("Current"))
        .unwrap();
    set.initialise_security("correct horse", &light()).unwrap();

    let mut stop = StopAt("Accounts");
    let err = set
        .renew_security("correct horse", &light(), &mut stop)
        .unwrap_err();
    assert!(err.is_cancelled());
    save_data_set(&mut set, &path).unwrap();

    let mut task = StopAt("");
    let loaded = load_data_set(&path, "correct horse", &mut task).unwrap();
    assert_eq!(loaded.control_keys().len(), 1);
    assert_eq!(loaded.control_data().len(), 1);

    let current = loaded.current_control_key().unwrap();
    assert_eq!(loaded.control_keys().ids(), vec![current]);
    let account = loaded.list::<Account>().unwrap().item(1).unwrap();
    assert_eq!(account.values().control_key, current);
    assert_eq!(account.values().name(), Some("Current"));
}
