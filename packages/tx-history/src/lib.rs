pub mod history;
pub mod summary;
pub mod transaction;


pub use crate::history::{LatestTx, LatestTxEntry, TransactionHistory, TransactionLog, TxNotifier};
pub use crate::summary::summarize_message;
pub use crate::transaction::{Transaction, TxResponse};
