//! Progress reporting and cancellation for long-running operations

use tracing::{debug, info};

use super::dataset::DataSet;
use crate::error::{MoneyWiseError, MoneyWiseResult};

/// Receives progress from a long-running operation
///
/// Every reporting method returns false to ask the operation to stop; the
/// operation then fails with [`MoneyWiseError::Cancelled`].
pub trait TaskControl {
    /// Announce a new stage of work
    fn set_new_stage(&mut self, stage: &str) -> bool;

    /// Declare the number of steps in the current stage
    fn set_num_steps(&mut self, steps: usize) -> bool;

    /// Report the number of steps completed so far
    fn set_steps_done(&mut self, done: usize) -> bool;

    /// Construct an empty data set of the application's shape
    fn new_data_set(&self) -> DataSet;
}

/// Turn a task-control verdict into a result
pub fn check_continue(proceed: bool, stage: &str) -> MoneyWiseResult<()> {
    if proceed {
        Ok(())
    } else {
        Err(MoneyWiseError::Cancelled(stage.to_string()))
    }
}

/// Task control that logs progress and never cancels
pub struct LoggingTask {
    stage: String,
    steps: usize,
    factory: fn() -> DataSet,
}

impl LoggingTask {
    pub fn new(factory: fn() -> DataSet) -> Self {
        Self {
            stage: String::new(),
            steps: 0,
            factory,
        }
    }
}

impl TaskControl for LoggingTask {
    fn set_new_stage(&mut self, stage: &str) -> bool {
        info!(stage, "Starting stage");
        self.stage = stage.to_string();
        self.steps = 0;
        true
    }

    fn set_num_steps(&mut self, steps: usize) -> bool {
        self.steps = steps;
        true
    }

    fn set_steps_done(&mut self, done: usize) -> bool {
        debug!(stage = %self.stage, done, total = self.steps, "Progress");
        true
    }

    fn new_data_set(&self) -> DataSet {
        (self.factory)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_continue() {
        assert!(check_continue(true, "Accounts").is_ok());
        let err = check_continue(false, "Accounts").unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(err.to_string(), "Operation cancelled during Accounts");
    }
}
