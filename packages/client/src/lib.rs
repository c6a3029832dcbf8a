pub mod broadcaster;
pub mod config;
mod error;
pub mod fetcher;
pub mod querier;
pub mod submitter;

pub use crate::broadcaster::{BroadcastRequest, RestBroadcaster, TxBroadcaster};
pub use crate::config::{NetworkConfig, GAS_FEE};
pub use crate::error::ClientError;
pub use crate::fetcher::{GrantFetcher, NetworkRefresh, SharedGrantStore};
pub use crate::querier::{GrantPage, GrantQuerier, PageRequest, PageResponse, RestGrantQuerier};
pub use crate::submitter::{GrantTxSubmitter, NetworkContext};
