//! Account CLI commands

use clap::Subcommand;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::passphrase::PassphraseSource;
use crate::config::{MoneyWisePaths, Settings};
use crate::data::{DataList, LoggingTask, StaticClass, StaticValues};
use crate::error::{MoneyWiseError, MoneyWiseResult};
use crate::models::{self, Account, AccountCategory, AccountCategoryClass, Currency, CurrencyClass};
use crate::storage::{load_data_set, save_data_set};

/// Account subcommands
#[derive(Subcommand)]
pub enum AccountCommands {
    /// Add a new account
    Add {
        /// Account name
        name: String,
        /// Category (checking, savings, credit-card, cash, investment, line-of-credit, other)
        #[arg(short, long, default_value = "checking")]
        category: String,
        /// Currency code; defaults to the configured currency
        #[arg(long)]
        currency: Option<String>,
    },
    /// List accounts
    List {
        /// Include closed accounts
        #[arg(short, long)]
        all: bool,
    },
}

#[derive(Tabled)]
struct AccountRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Currency")]
    currency: String,
    #[tabled(rename = "Closed")]
    closed: bool,
}

fn parse_class<E: StaticClass>(value: &str) -> MoneyWiseResult<E> {
    E::parse(value).ok_or_else(|| {
        let valid: Vec<_> = E::all().iter().map(|c| c.name()).collect();
        MoneyWiseError::Config(format!(
            "Invalid {}: '{}'. Valid values: {}",
            E::ITEM_TYPE,
            value,
            valid.join(", ")
        ))
    })
}

fn static_name<E: StaticClass>(list: &DataList<StaticValues<E>>, id: u32) -> String {
    list.find_item_by_id(id)
        .map(|item| item.values().name.clone())
        .unwrap_or_else(|| format!("#{}", id))
}

/// Handle an account command
pub fn handle_account_command(
    paths: &MoneyWisePaths,
    settings: &Settings,
    passphrase: &PassphraseSource,
    cmd: AccountCommands,
) -> MoneyWiseResult<()> {
    let file = paths.data_set_file();
    let passphrase = passphrase.current()?;
    let mut task = LoggingTask::new(models::new_data_set);
    let mut set = load_data_set(&file, &passphrase, &mut task)?;

    match cmd {
        AccountCommands::Add {
            name,
            category,
            currency,
        } => {
            let category: AccountCategoryClass = parse_class(&category)?;
            let currency: CurrencyClass = match currency {
                Some(code) => parse_class(&code)?,
                None => settings.default_currency,
            };

            let id = set
                .list_mut::<Account>()?
                .add_new_item(Account::new(name.as_str(), category, currency))?;
            save_data_set(&mut set, &file)?;

            println!("Created account: {}", name);
            println!("  Category: {}", category);
            println!("  Currency: {}", currency);
            println!("  ID: {}", id);
        }

        AccountCommands::List { all } => {
            let categories = set.list::<AccountCategory>()?;
            let currencies = set.list::<Currency>()?;
            let rows: Vec<AccountRow> = set
                .list::<Account>()?
                .live_items()
                .filter(|item| all || !item.values().closed)
                .map(|item| {
                    let account = item.values();
                    AccountRow {
                        id: item.id(),
                        name: account.name().unwrap_or("(locked)").to_string(),
                        category: static_name(categories, account.category),
                        currency: static_name(currencies, account.currency),
                        closed: account.closed,
                    }
                })
                .collect();

            if rows.is_empty() {
                println!("No accounts found.");
            } else {
                println!("{}", Table::new(rows).with(Style::sharp()));
            }
        }
    }

    Ok(())
}
