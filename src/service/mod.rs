pub mod error;
pub mod notifier;

pub use error::NotifierError;
pub use notifier::{Notifier, SubscriptionStorage, TransactionStorage};
