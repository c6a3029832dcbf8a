use std::env;

use crate::ClientError;

/// Gas limit used for every grant transaction
pub const GAS_FEE: u64 = 900_000;

/// What the client needs to know about a network to query and sign for it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkConfig {
    pub chain_id: String,
    /// Base url of the chain's REST (LCD) endpoint, without a trailing slash
    pub rest: String,
    /// bech32 prefix of account addresses
    pub prefix: String,
    /// Base fee denom, e.g. `uatom`
    pub denom: String,
    /// Display decimals of the fee denom
    pub decimals: u32,
    /// Fee paid per transaction in `denom`
    pub fee_amount: u128,
}

struct KnownNetwork {
    chain_id: &'static str,
    rest: &'static str,
    prefix: &'static str,
    denom: &'static str,
    decimals: u32,
    fee_amount: u128,
}

const KNOWN_NETWORKS: &[KnownNetwork] = &[
    KnownNetwork {
        chain_id: "cosmoshub-4",
        rest: "https://rest.cosmos.directory/cosmoshub",
        prefix: "cosmos",
        denom: "uatom",
        decimals: 6,
        fee_amount: 7_500,
    },
    KnownNetwork {
        chain_id: "osmosis-1",
        rest: "https://rest.cosmos.directory/osmosis",
        prefix: "osmo",
        denom: "uosmo",
        decimals: 6,
        fee_amount: 10_000,
    },
    KnownNetwork {
        chain_id: "juno-1",
        rest: "https://rest.cosmos.directory/juno",
        prefix: "juno",
        denom: "ujuno",
        decimals: 6,
        fee_amount: 20_000,
    },
];

impl From<&KnownNetwork> for NetworkConfig {
    fn from(known: &KnownNetwork) -> Self {
        NetworkConfig {
            chain_id: known.chain_id.to_string(),
            rest: known.rest.to_string(),
            prefix: known.prefix.to_string(),
            denom: known.denom.to_string(),
            decimals: known.decimals,
            fee_amount: known.fee_amount,
        }
    }
}

impl NetworkConfig {
    /// Built in settings for a chain id
    pub fn known(chain_id: &str) -> Option<NetworkConfig> {
        KNOWN_NETWORKS
            .iter()
            .find(|known| known.chain_id == chain_id)
            .map(NetworkConfig::from)
    }

    pub fn known_chain_ids() -> impl Iterator<Item = &'static str> {
        KNOWN_NETWORKS.iter().map(|known| known.chain_id)
    }

    /// Reads `CHAIN_ID` and optional overrides (`REST_URL`, `ADDRESS_PREFIX`,
    /// `FEE_DENOM`, `FEE_DECIMALS`, `FEE_AMOUNT`) from the environment.
    /// Chains that aren't built in need every override set.
    pub fn from_env() -> Result<NetworkConfig, ClientError> {
        let chain_id = required_var("CHAIN_ID")?;
        Self::from_env_for(&chain_id)
    }

    /// Like [`NetworkConfig::from_env`] for an already known chain id
    pub fn from_env_for(chain_id: &str) -> Result<NetworkConfig, ClientError> {
        let mut config = match Self::known(chain_id) {
            Some(config) => config,
            None => NetworkConfig {
                chain_id: chain_id.to_string(),
                rest: env::var("REST_URL")
                    .map_err(|_| ClientError::UnknownNetwork(chain_id.to_string()))?,
                prefix: env::var("ADDRESS_PREFIX")
                    .map_err(|_| ClientError::UnknownNetwork(chain_id.to_string()))?,
                denom: env::var("FEE_DENOM")
                    .map_err(|_| ClientError::UnknownNetwork(chain_id.to_string()))?,
                decimals: 6,
                fee_amount: 0,
            },
        };

        if let Ok(rest) = env::var("REST_URL") {
            config.rest = rest;
        }
        if let Ok(prefix) = env::var("ADDRESS_PREFIX") {
            config.prefix = prefix;
        }
        if let Ok(denom) = env::var("FEE_DENOM") {
            config.denom = denom;
        }
        if let Ok(decimals) = env::var("FEE_DECIMALS") {
            config.decimals = parse_var("FEE_DECIMALS", &decimals)?;
        }
        if let Ok(fee_amount) = env::var("FEE_AMOUNT") {
            config.fee_amount = parse_var("FEE_AMOUNT", &fee_amount)?;
        }
        config.rest = config.rest.trim_end_matches('/').to_string();

        Ok(config)
    }
}

fn required_var(name: &str) -> Result<String, ClientError> {
    env::var(name).map_err(|_| ClientError::MissingConfig(name.to_string()))
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ClientError> {
    value
        .parse()
        .map_err(|_| ClientError::InvalidConfig(name.to_string(), value.to_string()))
}
