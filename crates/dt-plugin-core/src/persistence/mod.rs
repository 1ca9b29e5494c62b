//! # Transactions
//!
//! All-or-nothing execution of a unit of work against the host data store.
//! Single attempt: no retry, no nesting, no isolation control.
use thiserror::Error;

use crate::host::DataStore;

/// Store failure; displays the raw store message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// The store reported an error before the transaction started.
    #[error("{0}")]
    Pending(String),
    /// The unit of work produced an error and was rolled back.
    #[error("{0}")]
    RolledBack(String),
}

impl PersistenceError {
    pub fn message(&self) -> &str {
        match self {
            PersistenceError::Pending(message) | PersistenceError::RolledBack(message) => message,
        }
    }
}

/// Run `work` inside `START TRANSACTION` / `COMMIT`.
///
/// An error already pending on the store is returned without starting. An
/// error returned by `work`, or one the store reports after it, rolls back
/// and is returned as is.
pub fn transaction<F>(store: &dyn DataStore, work: F) -> Result<(), PersistenceError>
where
    F: FnOnce() -> Result<(), String>,
{
    if let Some(pending) = store.last_error() {
        return Err(PersistenceError::Pending(pending));
    }
    store.execute("START TRANSACTION");
    let failed = work().err().or_else(|| store.last_error());
    if let Some(error) = failed {
        log::warn!("Rolling back transaction: {}", error);
        store.execute("ROLLBACK");
        return Err(PersistenceError::RolledBack(error));
    }
    store.execute("COMMIT");
    Ok(())
}
