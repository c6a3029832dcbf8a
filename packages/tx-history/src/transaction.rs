use authz_utils::msg_gen::Msg;
use chrono::{DateTime, Utc};
use cosmwasm_std::Coin;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::summary::summarize_message;

/// What the chain answered to a broadcast
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct TxResponse {
    pub code: u32,
    pub raw_log: String,
    pub transaction_hash: String,
    pub height: u64,
    pub gas_used: u64,
    pub gas_wanted: u64,
}

impl TxResponse {
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Transaction {
    pub transaction_hash: String,
    pub code: u32,
    pub raw_log: String,
    pub height: u64,
    pub gas_used: u64,
    pub gas_wanted: u64,
    pub fee: Vec<Coin>,
    pub memo: String,
    /// JSON form of each message, tagged with `@type`
    pub messages: Vec<Value>,
    pub chain_id: String,
    pub address: String,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        response: TxResponse,
        msgs: &[Msg],
        fee: Vec<Coin>,
        memo: impl Into<String>,
        chain_id: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Transaction {
            transaction_hash: response.transaction_hash,
            code: response.code,
            raw_log: response.raw_log,
            height: response.height,
            gas_used: response.gas_used,
            gas_wanted: response.gas_wanted,
            fee,
            memo: memo.into(),
            messages: msgs.iter().map(|m| m.value.clone()).collect(),
            chain_id: chain_id.into(),
            address: address.into(),
            timestamp: Utc::now(),
        }
    }

    /// One line per message, amounts shown in `coin_denom` display units
    pub fn summaries(&self, coin_denom: &str, decimals: u32) -> Vec<String> {
        self.messages
            .iter()
            .map(|msg| summarize_message(msg, coin_denom, decimals))
            .collect()
    }
}
