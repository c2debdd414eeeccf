//! Passphrase input
//!
//! Taken from `--passphrase` or `MONEYWISE_PASSPHRASE` when given,
//! otherwise read from the terminal without echo.

use crate::crypto::SecureString;
use crate::error::{MoneyWiseError, MoneyWiseResult};

pub const PASSPHRASE_ENV: &str = "MONEYWISE_PASSPHRASE";
pub const MIN_PASSPHRASE_LEN: usize = 8;

/// Where the passphrase comes from
#[derive(Debug, Clone, Default)]
pub struct PassphraseSource {
    given: Option<String>,
}

impl PassphraseSource {
    pub fn new(given: Option<String>) -> Self {
        Self { given }
    }

    /// The passphrase of an existing data set
    pub fn current(&self) -> MoneyWiseResult<SecureString> {
        match &self.given {
            Some(given) => Ok(SecureString::new(given.as_str())),
            None => prompt("Passphrase: ").map(SecureString::from),
        }
    }

    /// A passphrase for a new data set, confirmed when prompted
    pub fn new_passphrase(&self) -> MoneyWiseResult<SecureString> {
        if let Some(given) = &self.given {
            check_length(given)?;
            return Ok(SecureString::new(given.as_str()));
        }

        loop {
            let first = prompt("New passphrase: ")?;
            if let Err(e) = check_length(&first) {
                println!("{}", e);
                continue;
            }
            let second = prompt("Confirm passphrase: ")?;
            if first != second {
                println!("Passphrases do not match. Please try again.");
                continue;
            }
            return Ok(SecureString::from(first));
        }
    }
}

fn check_length(passphrase: &str) -> MoneyWiseResult<()> {
    if passphrase.chars().count() < MIN_PASSPHRASE_LEN {
        return Err(MoneyWiseError::Config(format!(
            "Passphrase must be at least {} characters",
            MIN_PASSPHRASE_LEN
        )));
    }
    Ok(())
}

fn prompt(message: &str) -> MoneyWiseResult<String> {
    rpassword::prompt_password(message)
        .map_err(|e| MoneyWiseError::Encryption(format!("Failed to read passphrase: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_given_passphrase_is_used() {
        let source = PassphraseSource::new(Some("correct horse".into()));
        assert_eq!(source.current().unwrap().as_str(), "correct horse");
        assert_eq!(source.new_passphrase().unwrap().as_str(), "correct horse");
    }

    #[test]
    fn test_short_new_passphrase_rejected() {
        let source = PassphraseSource::new(Some("short".into()));
        let err = source.new_passphrase().unwrap_err();
        assert!(err.to_string().contains("at least 8"));
    }
}
