use authz_utils::helpers::{format_number, parse_denom_amount, shorten};
use authz_utils::msg_gen::{
    MSG_DELEGATE_TYPE_URL, MSG_DEPOSIT_TYPE_URL, MSG_EXEC_TYPE_URL,
    MSG_GRANT_ALLOWANCE_TYPE_URL, MSG_GRANT_TYPE_URL, MSG_REDELEGATE_TYPE_URL,
    MSG_REVOKE_TYPE_URL, MSG_SEND_TYPE_URL, MSG_TRANSFER_TYPE_URL, MSG_UNDELEGATE_TYPE_URL,
    MSG_VOTE_TYPE_URL, MSG_WITHDRAW_REWARDS_TYPE_URL,
};
use serde_json::Value;

const ADDRESS_DISPLAY_LEN: usize = 20;

/// Renders a history message as a single line, picking the wording by its `@type`
pub fn summarize_message(msg: &Value, coin_denom: &str, decimals: u32) -> String {
    let msg_type = msg.get("@type").and_then(Value::as_str).unwrap_or_default();

    match msg_type {
        MSG_DELEGATE_TYPE_URL => format!(
            "Delegated {} {} to {}",
            coin_amount(msg.get("amount"), decimals),
            coin_denom,
            address_field(msg, "validator_address"),
        ),
        MSG_UNDELEGATE_TYPE_URL => format!(
            "UnDelegated {} {} from {}",
            coin_amount(msg.get("amount"), decimals),
            coin_denom,
            address_field(msg, "validator_address"),
        ),
        MSG_REDELEGATE_TYPE_URL => format!(
            "Redelegated {} {}",
            coin_amount(msg.get("amount"), decimals),
            coin_denom
        ),
        MSG_SEND_TYPE_URL => format!(
            "Sent {} {} to {}",
            coin_amount(msg.get("amount").and_then(|a| a.get(0)), decimals),
            coin_denom,
            address_field(msg, "to_address"),
        ),
        MSG_WITHDRAW_REWARDS_TYPE_URL => format!(
            "Claimed Rewards from {}",
            address_field(msg, "validator_address")
        ),
        MSG_GRANT_TYPE_URL => "Grant Authz".to_string(),
        MSG_TRANSFER_TYPE_URL => "IBC Send".to_string(),
        MSG_EXEC_TYPE_URL => "Exec Authz".to_string(),
        MSG_REVOKE_TYPE_URL => "Revoke Authz".to_string(),
        MSG_GRANT_ALLOWANCE_TYPE_URL => "Grant Allowance".to_string(),
        MSG_VOTE_TYPE_URL => "Vote".to_string(),
        MSG_DEPOSIT_TYPE_URL => "Deposit".to_string(),
        "" => "Unknown".to_string(),
        other => other.rsplit('.').next().unwrap_or(other).to_string(),
    }
}

fn coin_amount(coin: Option<&Value>, decimals: u32) -> String {
    let amount = coin
        .and_then(|c| c.get("amount"))
        .and_then(Value::as_str)
        .unwrap_or("0");
    format_number(parse_denom_amount(amount, decimals))
}

fn address_field(msg: &Value, field: &str) -> String {
    shorten(
        msg.get(field).and_then(Value::as_str).unwrap_or_default(),
        ADDRESS_DISPLAY_LEN,
    )
}
