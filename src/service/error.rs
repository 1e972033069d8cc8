use crate::ledger::LedgerError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifierError {
    #[error("Address {0} is not subscribed")]
    NotSubscribed(String),

    /// Subscribed, but the watcher has not recorded anything yet
    #[error("No transactions found for address {0}")]
    NoTransactions(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
