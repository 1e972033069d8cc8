use thiserror::Error;

/// Failures talking to the remote ledger. None of them is fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Peer unreachable or request timed out
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected HTTP status {0} from ledger")]
    Status(u16),

    /// Body was not JSON or did not have the expected shape
    #[error("Malformed ledger response: {0}")]
    Malformed(String),

    /// The ledger answered with a JSON-RPC error object
    #[error("Ledger error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The ledger answered with a null result, e.g. a block not produced yet
    #[error("Ledger returned no result for {0}")]
    MissingResult(String),
}

impl From<reqwest::Error> for LedgerError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => LedgerError::Status(status.as_u16()),
            None if err.is_decode() => LedgerError::Malformed(err.to_string()),
            None => LedgerError::Transport(err.to_string()),
        }
    }
}
