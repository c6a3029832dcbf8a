pub mod state;
pub mod store;

#[cfg(test)]
mod tests;

pub use crate::state::{FetchState, NetworkGrantState, TxStatus};
pub use crate::store::{CrossNetworkIndex, FetchTicket, GrantDirection, GrantStore};
