mod broadcaster;
mod querier;

pub use crate::broadcaster::MockBroadcaster;
pub use crate::querier::{page_key, MockGrantQuerier, QueryCall};

use bech32::{ToBase32, Variant};

/// A valid bech32 address made of one repeated byte
pub fn test_address(prefix: &str, byte: u8) -> String {
    bech32::encode(prefix, [byte; 20].to_base32(), Variant::Bech32)
        .unwrap_or_else(|e| panic!("invalid test prefix {}: {}", prefix, e))
}
