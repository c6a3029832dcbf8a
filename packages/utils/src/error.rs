use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AddressError {
    #[error("{0} is not a valid bech32 address: {1}")]
    InvalidBech32(String, String),

    #[error("{0} is not a valid address prefix")]
    InvalidPrefix(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum MsgGenError {
    #[error("{0} authorizations can't be built by this client")]
    UnsupportedAuthorization(String),

    #[error("Periodic allowance period must be positive")]
    InvalidPeriod,

    #[error("Vote option {0} is not one of yes, no, abstain, no_with_veto")]
    InvalidVoteOption(String),
}
