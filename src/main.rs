use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use moneywise::cli::{
    handle_account_command, handle_check, handle_config, handle_diff, handle_init, handle_renew,
    AccountCommands, PassphraseSource,
};
use moneywise::config::{MoneyWisePaths, Settings};

const LOG_ENV: &str = "MONEYWISE_LOG";

#[derive(Parser)]
#[command(
    name = "moneywise",
    author = "Kaylee Beyene",
    version,
    about = "Versioned, encrypted personal finance records",
    long_about = "MoneyWise keeps accounts, transactions and reference data in a \
                  versioned data set. Sensitive values are encrypted under a key \
                  protected by your passphrase."
)]
struct Cli {
    /// Passphrase protecting the data set (prompted for when omitted)
    #[arg(long, global = true, env = "MONEYWISE_PASSPHRASE", hide_env_values = true)]
    passphrase: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new data set with default reference data
    Init,

    /// Load the data set, repair security records and validate
    Check,

    /// Rotate the encryption key
    Renew,

    /// Show differences between two saved data sets
    Diff {
        /// The older data set file
        old: PathBuf,
        /// The newer data set file
        new: PathBuf,
    },

    /// Account management commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Show current configuration and paths
    Config,
}

fn init_logger(verbose: bool) {
    let filter = match std::env::var(LOG_ENV) {
        Ok(directives) if !directives.is_empty() => EnvFilter::new(directives),
        _ if verbose => EnvFilter::new("moneywise=debug"),
        _ => EnvFilter::new("warn"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let paths = MoneyWisePaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    let passphrase = PassphraseSource::new(cli.passphrase);

    match cli.command {
        Some(Commands::Init) => handle_init(&paths, &settings, &passphrase)?,
        Some(Commands::Check) => handle_check(&paths, &settings, &passphrase)?,
        Some(Commands::Renew) => handle_renew(&paths, &settings, &passphrase)?,
        Some(Commands::Diff { old, new }) => handle_diff(&old, &new)?,
        Some(Commands::Account(cmd)) => {
            handle_account_command(&paths, &settings, &passphrase, cmd)?
        }
        Some(Commands::Config) => handle_config(&paths, &settings)?,
        None => {
            println!("MoneyWise - versioned personal finance records");
            println!();
            println!("Run 'moneywise --help' for usage information.");
            println!("Run 'moneywise init' to create a data set.");
        }
    }

    Ok(())
}
