use async_trait::async_trait;
use authz_tx_history::TxResponse;
use authz_utils::msg_gen::Msg;
use cosmrs::crypto::secp256k1::SigningKey;
use cosmrs::tendermint::chain;
use cosmrs::tx::{Body, Fee, SignDoc, SignerInfo};
use cosmrs::{AccountId, Coin as CosmrsCoin, Denom};
use cosmwasm_std::{Binary, Coin, Uint64};
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ClientError, NetworkConfig};

/// Everything needed to sign one transaction
#[derive(Clone, Debug, PartialEq)]
pub struct BroadcastRequest {
    pub msgs: Vec<Msg>,
    pub fee: Coin,
    pub gas_limit: u64,
    pub memo: String,
    /// Account paying the fee through a fee grant
    pub fee_granter: Option<String>,
}

/// Signs and broadcasts transactions for the wallet's account
#[async_trait]
pub trait TxBroadcaster: Send + Sync {
    /// Returns the chain's answer. A non-zero `code` is not an error at this level.
    async fn sign_and_broadcast(
        &self,
        network: &NetworkConfig,
        request: &BroadcastRequest,
    ) -> Result<TxResponse, ClientError>;
}

#[derive(Serialize)]
struct BroadcastTxBody {
    tx_bytes: Binary,
    mode: &'static str,
}

#[derive(Deserialize)]
struct BroadcastTxResponse {
    tx_response: RestTxResponse,
}

#[derive(Deserialize)]
struct RestTxResponse {
    #[serde(default)]
    height: Uint64,
    txhash: String,
    #[serde(default)]
    code: u32,
    #[serde(default)]
    raw_log: String,
    #[serde(default)]
    gas_wanted: Uint64,
    #[serde(default)]
    gas_used: Uint64,
}

impl From<RestTxResponse> for TxResponse {
    fn from(res: RestTxResponse) -> Self {
        TxResponse {
            code: res.code,
            raw_log: res.raw_log,
            transaction_hash: res.txhash,
            height: res.height.u64(),
            gas_used: res.gas_used.u64(),
            gas_wanted: res.gas_wanted.u64(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct AccountInfo {
    account_number: u64,
    sequence: u64,
}

/// Signs with a local secp256k1 key and broadcasts over the chain's REST endpoint
#[derive(Clone)]
pub struct RestBroadcaster {
    client: Client,
    key_bytes: Vec<u8>,
}

impl std::fmt::Debug for RestBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestBroadcaster").finish_non_exhaustive()
    }
}

impl RestBroadcaster {
    /// `private_key` is the hex encoded secp256k1 secret
    pub fn from_hex(private_key: &str) -> Result<Self, ClientError> {
        let key_bytes = hex::decode(private_key.trim().trim_start_matches("0x"))
            .map_err(|e| ClientError::Signing(e.to_string()))?;
        // fail early on a key that can't sign
        signing_key(&key_bytes)?;

        Ok(RestBroadcaster {
            client: Client::new(),
            key_bytes,
        })
    }

    /// Account address of the key on a network
    pub fn address(&self, prefix: &str) -> Result<String, ClientError> {
        signing_key(&self.key_bytes)?
            .public_key()
            .account_id(prefix)
            .map(|id| id.to_string())
            .map_err(|e| ClientError::Signing(e.to_string()))
    }

    async fn account_info(
        &self,
        network: &NetworkConfig,
        address: &str,
    ) -> Result<AccountInfo, ClientError> {
        let url = format!(
            "{}/cosmos/auth/v1beta1/accounts/{}",
            network.rest.trim_end_matches('/'),
            address
        );
        let body = self.get_text(&url).await?;
        let value: Value = serde_json::from_str(&body)?;
        parse_account_info(&value)
    }

    async fn get_text(&self, url: &str) -> Result<String, ClientError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Transport {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    fn sign_tx(
        &self,
        network: &NetworkConfig,
        request: &BroadcastRequest,
        account: AccountInfo,
    ) -> Result<Vec<u8>, ClientError> {
        let key = signing_key(&self.key_bytes)?;

        let body = Body::new(
            request.msgs.iter().map(|msg| msg.any.clone()),
            request.memo.clone(),
            0u32,
        );

        let denom = request
            .fee
            .denom
            .parse::<Denom>()
            .map_err(|e| ClientError::Signing(e.to_string()))?;
        let mut fee = Fee::from_amount_and_gas(
            CosmrsCoin {
                denom,
                amount: request.fee.amount.u128(),
            },
            request.gas_limit,
        );
        fee.granter = request
            .fee_granter
            .as_deref()
            .map(str::parse::<AccountId>)
            .transpose()
            .map_err(|e| ClientError::Signing(e.to_string()))?;

        let auth_info =
            SignerInfo::single_direct(Some(key.public_key()), account.sequence).auth_info(fee);
        let chain_id = network
            .chain_id
            .parse::<chain::Id>()
            .map_err(|e| ClientError::Signing(e.to_string()))?;

        SignDoc::new(&body, &auth_info, &chain_id, account.account_number)
            .and_then(|doc| doc.sign(&key))
            .and_then(|raw| raw.to_bytes())
            .map_err(|e| ClientError::Signing(e.to_string()))
    }
}

#[async_trait]
impl TxBroadcaster for RestBroadcaster {
    async fn sign_and_broadcast(
        &self,
        network: &NetworkConfig,
        request: &BroadcastRequest,
    ) -> Result<TxResponse, ClientError> {
        let address = self.address(&network.prefix)?;
        let account = self.account_info(network, &address).await?;
        debug!(
            "signing {} msgs for {} (account {}, sequence {})",
            request.msgs.len(),
            address,
            account.account_number,
            account.sequence
        );

        let tx_bytes = self.sign_tx(network, request, account)?;

        let url = format!("{}/cosmos/tx/v1beta1/txs", network.rest.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&BroadcastTxBody {
                tx_bytes: Binary::from(tx_bytes),
                mode: "BROADCAST_MODE_SYNC",
            })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Transport {
                status: status.as_u16(),
                body,
            });
        }

        let res: TxResponse = serde_json::from_str::<BroadcastTxResponse>(&body)?
            .tx_response
            .into();
        info!(
            "broadcast {} on {}: code {}",
            res.transaction_hash, network.chain_id, res.code
        );
        Ok(res)
    }
}

fn signing_key(key_bytes: &[u8]) -> Result<SigningKey, ClientError> {
    SigningKey::from_slice(key_bytes).map_err(|e| ClientError::Signing(e.to_string()))
}

/// Reads account number and sequence from an `auth/v1beta1/accounts` response.
/// Vesting accounts nest them under `base_vesting_account.base_account`.
fn parse_account_info(value: &Value) -> Result<AccountInfo, ClientError> {
    let account = &value["account"];
    let base = if account.get("base_vesting_account").is_some() {
        &account["base_vesting_account"]["base_account"]
    } else {
        account
    };

    let field = |name: &str| -> Result<u64, ClientError> {
        match &base[name] {
            Value::String(s) => s
                .parse()
                .map_err(|_| ClientError::Signing(format!("invalid account {}: {}", name, s))),
            Value::Number(n) => n
                .as_u64()
                .ok_or_else(|| ClientError::Signing(format!("invalid account {}", name))),
            // a fresh account omits zero values
            Value::Null => Ok(0),
            other => Err(ClientError::Signing(format!(
                "invalid account {}: {}",
                name, other
            ))),
        }
    };

    Ok(AccountInfo {
        account_number: field("account_number")?,
        sequence: field("sequence")?,
    })
}
