//! First-run setup

use tracing::info;

use super::snapshot::save_data_set;
use crate::config::{MoneyWisePaths, Settings};
use crate::data::DataSet;
use crate::error::{MoneyWiseError, MoneyWiseResult};
use crate::models;

/// Create the directories, settings file and an initial data set
///
/// The data set holds the default reference data and a first key set
/// protected by `passphrase`. Fails if a data set already exists.
pub fn initialize_storage(
    paths: &MoneyWisePaths,
    settings: &Settings,
    passphrase: &str,
) -> MoneyWiseResult<DataSet> {
    let file = paths.data_set_file();
    if file.exists() {
        return Err(MoneyWiseError::Config(format!(
            "A data set already exists at {}",
            file.display()
        )));
    }

    paths.ensure_directories()?;
    settings.save(paths)?;

    let mut set = models::new_data_set();
    set.set_progress_interval(settings.progress_interval);
    models::populate_static_data(&mut set)?;
    set.initialise_security(passphrase, &settings.security)?;
    save_data_set(&mut set, &file)?;

    info!(path = %file.display(), "Initialised data set");
    Ok(set)
}
