//! Data set lifecycle commands: init, check, renew, diff and config

use std::path::Path;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::passphrase::PassphraseSource;
use crate::config::{MoneyWisePaths, Settings};
use crate::data::{DataSet, LoggingTask};
use crate::error::{MoneyWiseError, MoneyWiseResult};
use crate::models;
use crate::report::describe_differences;
use crate::storage::{initialize_storage, load_data_set, read_data_set, save_data_set};

#[derive(Tabled)]
struct ListSummary {
    #[tabled(rename = "List")]
    name: &'static str,
    #[tabled(rename = "Items")]
    items: usize,
    #[tabled(rename = "State")]
    state: String,
}

fn summarize(set: &DataSet) -> String {
    let rows: Vec<ListSummary> = set
        .lists()
        .map(|list| ListSummary {
            name: list.list_name(),
            items: list.len(),
            state: list.edit_state().to_string(),
        })
        .collect();
    Table::new(rows).with(Style::sharp()).to_string()
}

fn logging_task() -> LoggingTask {
    LoggingTask::new(models::new_data_set)
}

fn require_data_set(paths: &MoneyWisePaths) -> MoneyWiseResult<std::path::PathBuf> {
    let file = paths.data_set_file();
    if !file.exists() {
        return Err(MoneyWiseError::Config(
            "No data set found. Run 'moneywise init' first.".to_string(),
        ));
    }
    Ok(file)
}

/// Create a new data set protected by a passphrase
pub fn handle_init(
    paths: &MoneyWisePaths,
    settings: &Settings,
    passphrase: &PassphraseSource,
) -> MoneyWiseResult<()> {
    let passphrase = passphrase.new_passphrase()?;
    let set = initialize_storage(paths, settings, &passphrase)?;

    println!("Initialised MoneyWise at: {}", paths.base_dir().display());
    println!("{}", summarize(&set));
    Ok(())
}

/// Load, repair and validate the data set, printing a per-list summary
pub fn handle_check(
    paths: &MoneyWisePaths,
    settings: &Settings,
    passphrase: &PassphraseSource,
) -> MoneyWiseResult<()> {
    let file = require_data_set(paths)?;
    let passphrase = passphrase.current()?;
    let mut task = logging_task();

    let mut set = read_data_set(&file, &task)?;
    set.set_progress_interval(settings.progress_interval);
    set.unlock_security(&passphrase)?;
    let repaired = set.check_security(&mut task)?;
    let state = set.validate();

    println!("{}", summarize(&set));
    println!("Data set state: {}", state);

    if repaired {
        save_data_set(&mut set, &file)?;
        println!("Security records were repaired and saved.");
    }
    Ok(())
}

/// Rotate to a fresh control key and re-encrypt everything under it
pub fn handle_renew(
    paths: &MoneyWisePaths,
    settings: &Settings,
    passphrase: &PassphraseSource,
) -> MoneyWiseResult<()> {
    let file = require_data_set(paths)?;
    let passphrase = passphrase.current()?;
    let mut task = logging_task();

    let mut set = load_data_set(&file, &passphrase, &mut task)?;
    set.set_progress_interval(settings.progress_interval);
    let control_key = set.renew_security(&passphrase, &settings.security, &mut task)?;
    save_data_set(&mut set, &file)?;

    println!("Renewed security: now using control key {}", control_key);
    Ok(())
}

/// Print the differences between two snapshot files
pub fn handle_diff(old: &Path, new: &Path) -> MoneyWiseResult<()> {
    let task = logging_task();
    let old = read_data_set(old, &task)?;
    let new = read_data_set(new, &task)?;

    let differences = DataSet::derive_differences(&new, &old)?;
    let rows = describe_differences(&differences);
    if rows.is_empty() {
        println!("No differences.");
        return Ok(());
    }

    let count = rows.len();
    println!("{}", Table::new(rows).with(Style::sharp()));
    println!("{} changed item(s)", count);
    Ok(())
}

/// Show the resolved paths and settings
pub fn handle_config(paths: &MoneyWisePaths, settings: &Settings) -> MoneyWiseResult<()> {
    println!("MoneyWise Configuration");
    println!("=======================");
    println!("Base directory:  {}", paths.base_dir().display());
    println!("Settings file:   {}", paths.settings_file().display());
    println!("Data set file:   {}", paths.data_set_file().display());
    println!("Initialised:     {}", paths.is_initialized());
    println!();
    println!("Settings:");
    println!("  Default currency:  {}", settings.default_currency);
    println!("  Progress interval: {}", settings.progress_interval);
    println!(
        "  Key derivation:    memory {} KiB, {} passes, {} lanes",
        settings.security.memory_cost, settings.security.time_cost, settings.security.parallelism
    );
    Ok(())
}
