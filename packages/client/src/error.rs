use authz_utils::{AddressError, MsgGenError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    /// The node answered with a non-success status, `body` is what it sent back
    #[error("{body}")]
    Transport { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The transaction was broadcast but the chain returned a non-zero code
    #[error("{raw_log}")]
    ChainRejection { code: u32, raw_log: String },

    #[error("{0}")]
    Address(#[from] AddressError),

    #[error("{0}")]
    MsgGen(#[from] MsgGenError),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("{0} is not a known network, set its REST_URL, ADDRESS_PREFIX and FEE_DENOM")]
    UnknownNetwork(String),

    #[error("Missing configuration value {0}")]
    MissingConfig(String),

    #[error("Invalid configuration value for {0}: {1}")]
    InvalidConfig(String, String),
}
