use crate::AddressError;

/// Prefix that grants from every network are indexed under
pub const CANONICAL_PREFIX: &str = "cosmos";

/// Re-encodes a bech32 address with a different human readable prefix,
/// e.g. `osmo1...` -> `cosmos1...` for the same key
pub fn address_by_prefix(address: &str, prefix: &str) -> Result<String, AddressError> {
    let (_, data, variant) = bech32::decode(address)
        .map_err(|e| AddressError::InvalidBech32(address.to_string(), e.to_string()))?;

    bech32::encode(prefix, data, variant)
        .map_err(|_| AddressError::InvalidPrefix(prefix.to_string()))
}

/// The address under which a granter's grants are indexed across networks.
/// Strings that don't decode as bech32 are used as is.
pub fn canonical_address(address: &str) -> String {
    address_by_prefix(address, CANONICAL_PREFIX).unwrap_or_else(|_| address.to_string())
}

/// Returns the human readable part of a bech32 address
pub fn address_prefix(address: &str) -> Result<String, AddressError> {
    bech32::decode(address)
        .map(|(hrp, _, _)| hrp)
        .map_err(|e| AddressError::InvalidBech32(address.to_string(), e.to_string()))
}

/// Validates that the address decodes and carries the expected prefix
pub fn validate_address(address: &str, prefix: &str) -> Result<(), AddressError> {
    let hrp = address_prefix(address)?;
    if hrp != prefix {
        return Err(AddressError::InvalidPrefix(hrp));
    }
    Ok(())
}
