pub mod address;
mod error;
pub mod helpers;
pub mod msg_gen;

#[cfg(test)]
mod tests;

pub use crate::error::{AddressError, MsgGenError};
