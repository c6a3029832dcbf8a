use authz_grant_spec::grants::{
    Authorization, GenericAuthorization, SendAuthorization as SendAuthorizationSpec,
    StakeAuthorization as StakeAuthorizationSpec,
};
use authz_grant_spec::{GrantRequest, RevokeRequest};
use chrono::{DateTime, Utc};
use cosmos_sdk_proto::cosmos::authz::v1beta1::{
    GenericAuthorization as ProtoGenericAuthorization, Grant as ProtoGrant, MsgExec, MsgGrant,
    MsgRevoke,
};
use cosmos_sdk_proto::cosmos::bank::v1beta1::MsgSend;
use cosmos_sdk_proto::cosmos::base::v1beta1::Coin as ProtoCoin;
use cosmos_sdk_proto::cosmos::feegrant::v1beta1::{
    BasicAllowance, MsgGrantAllowance, PeriodicAllowance,
};
use cosmos_sdk_proto::cosmos::gov::v1beta1::{MsgDeposit, MsgVote};
use cosmos_sdk_proto::cosmos::staking::v1beta1::MsgDelegate;
use cosmos_sdk_proto::traits::Message;
use cosmos_sdk_proto::Any;
use cosmwasm_std::Coin;
use serde_json::{json, Value};
use std::str::FromStr;

use crate::MsgGenError;

pub const MSG_GRANT_TYPE_URL: &str = "/cosmos.authz.v1beta1.MsgGrant";
pub const MSG_REVOKE_TYPE_URL: &str = "/cosmos.authz.v1beta1.MsgRevoke";
pub const MSG_EXEC_TYPE_URL: &str = "/cosmos.authz.v1beta1.MsgExec";
pub const MSG_GRANT_ALLOWANCE_TYPE_URL: &str = "/cosmos.feegrant.v1beta1.MsgGrantAllowance";
pub const MSG_SEND_TYPE_URL: &str = "/cosmos.bank.v1beta1.MsgSend";
pub const MSG_DELEGATE_TYPE_URL: &str = "/cosmos.staking.v1beta1.MsgDelegate";
pub const MSG_UNDELEGATE_TYPE_URL: &str = "/cosmos.staking.v1beta1.MsgUndelegate";
pub const MSG_REDELEGATE_TYPE_URL: &str = "/cosmos.staking.v1beta1.MsgBeginRedelegate";
pub const MSG_WITHDRAW_REWARDS_TYPE_URL: &str =
    "/cosmos.distribution.v1beta1.MsgWithdrawDelegatorReward";
pub const MSG_VOTE_TYPE_URL: &str = "/cosmos.gov.v1beta1.MsgVote";
pub const MSG_DEPOSIT_TYPE_URL: &str = "/cosmos.gov.v1beta1.MsgDeposit";
pub const MSG_TRANSFER_TYPE_URL: &str = "/ibc.applications.transfer.v1.MsgTransfer";

const BASIC_ALLOWANCE_TYPE_URL: &str = "/cosmos.feegrant.v1beta1.BasicAllowance";
const PERIODIC_ALLOWANCE_TYPE_URL: &str = "/cosmos.feegrant.v1beta1.PeriodicAllowance";

/// A message ready for signing along with the JSON form kept in transaction history
#[derive(Clone, Debug, PartialEq)]
pub struct Msg {
    pub type_url: String,
    pub any: Any,
    pub value: Value,
}

impl Msg {
    fn new<M: Message>(type_url: &str, msg: &M, mut value: Value) -> Self {
        if let Value::Object(fields) = &mut value {
            fields.insert("@type".to_string(), Value::String(type_url.to_string()));
        }
        Msg {
            type_url: type_url.to_string(),
            any: Any {
                type_url: type_url.to_string(),
                value: msg.encode_to_vec(),
            },
            value,
        }
    }
}

// The sdk's SendAuthorization and StakeAuthorization as they are on chains
// with send allow lists. The stake validator oneof is written as two optional
// fields, which is identical on the wire.
#[derive(Clone, PartialEq, ::prost::Message)]
struct SendAuthorization {
    #[prost(message, repeated, tag = "1")]
    spend_limit: Vec<ProtoCoin>,
    #[prost(string, repeated, tag = "2")]
    allow_list: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
struct StakeAuthorization {
    #[prost(message, optional, tag = "1")]
    max_tokens: Option<ProtoCoin>,
    #[prost(message, optional, tag = "2")]
    allow_list: Option<Validators>,
    #[prost(message, optional, tag = "3")]
    deny_list: Option<Validators>,
    #[prost(int32, tag = "4")]
    authorization_type: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
struct Validators {
    #[prost(string, repeated, tag = "1")]
    address: Vec<String>,
}

pub fn proto_coin(coin: &Coin) -> ProtoCoin {
    ProtoCoin {
        denom: coin.denom.clone(),
        amount: coin.amount.to_string(),
    }
}

fn proto_coins(coins: &[Coin]) -> Vec<ProtoCoin> {
    coins.iter().map(proto_coin).collect()
}

fn proto_timestamp(time: &DateTime<Utc>) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: time.timestamp(),
        nanos: time.timestamp_subsec_nanos() as i32,
    }
}

/// Encodes an authorization as the Any packed inside a MsgGrant
pub fn authorization_any(authorization: &Authorization) -> Result<Any, MsgGenError> {
    let (type_url, value) = match authorization {
        Authorization::Generic(GenericAuthorization { msg }) => (
            authorization.type_url(),
            ProtoGenericAuthorization { msg: msg.clone() }.encode_to_vec(),
        ),
        Authorization::Send(SendAuthorizationSpec {
            spend_limit,
            allow_list,
        }) => (
            authorization.type_url(),
            SendAuthorization {
                spend_limit: proto_coins(spend_limit),
                allow_list: allow_list.clone(),
            }
            .encode_to_vec(),
        ),
        Authorization::Stake(StakeAuthorizationSpec {
            max_tokens,
            allow_list,
            deny_list,
            authorization_type,
        }) => (
            authorization.type_url(),
            StakeAuthorization {
                max_tokens: max_tokens.as_ref().map(proto_coin),
                allow_list: allow_list.as_ref().map(|v| Validators {
                    address: v.address.clone(),
                }),
                // the sdk only accepts one of the two lists
                deny_list: match allow_list {
                    Some(_) => None,
                    None => deny_list.as_ref().map(|v| Validators {
                        address: v.address.clone(),
                    }),
                },
                authorization_type: *authorization_type as i32,
            }
            .encode_to_vec(),
        ),
        Authorization::ContractExecution(_)
        | Authorization::Transfer(_)
        | Authorization::Unknown { .. } => {
            return Err(MsgGenError::UnsupportedAuthorization(
                authorization.type_url().to_string(),
            ))
        }
    };

    Ok(Any {
        type_url: type_url.to_string(),
        value,
    })
}

/// Creates a MsgGrant message
pub fn grant_msg(request: &GrantRequest) -> Result<Msg, MsgGenError> {
    let msg = MsgGrant {
        granter: request.granter.clone(),
        grantee: request.grantee.clone(),
        grant: Some(ProtoGrant {
            authorization: Some(authorization_any(&request.authorization)?),
            expiration: request.expiration.as_ref().map(proto_timestamp),
        }),
    };

    Ok(Msg::new(
        MSG_GRANT_TYPE_URL,
        &msg,
        json!({
            "granter": request.granter,
            "grantee": request.grantee,
            "grant": {
                "authorization": request.authorization,
                "expiration": request.expiration,
            },
        }),
    ))
}

/// Creates a MsgRevoke message
pub fn revoke_msg(request: &RevokeRequest) -> Msg {
    let msg = MsgRevoke {
        granter: request.granter.clone(),
        grantee: request.grantee.clone(),
        msg_type_url: request.msg_type_url.clone(),
    };

    Msg::new(
        MSG_REVOKE_TYPE_URL,
        &msg,
        json!({
            "granter": request.granter,
            "grantee": request.grantee,
            "msg_type_url": request.msg_type_url,
        }),
    )
}

/// Creates a MsgExec message wrapping messages executed on a granter's behalf
pub fn exec_msg(grantee: &str, msgs: Vec<Msg>) -> Msg {
    let (any_msgs, json_msgs): (Vec<Any>, Vec<Value>) =
        msgs.into_iter().map(|m| (m.any, m.value)).unzip();

    let exec = MsgExec {
        grantee: grantee.to_string(),
        msgs: any_msgs,
    };

    Msg::new(
        MSG_EXEC_TYPE_URL,
        &exec,
        json!({
            "grantee": grantee,
            "msgs": json_msgs,
        }),
    )
}

/// Fee allowance a granter pays for on behalf of a grantee
#[derive(Clone, Debug, PartialEq)]
pub enum Allowance {
    Basic {
        spend_limit: Vec<Coin>,
        expiration: Option<DateTime<Utc>>,
    },
    Periodic {
        spend_limit: Vec<Coin>,
        expiration: Option<DateTime<Utc>>,
        period: chrono::Duration,
        period_spend_limit: Vec<Coin>,
    },
}

fn basic_allowance(spend_limit: &[Coin], expiration: &Option<DateTime<Utc>>) -> BasicAllowance {
    BasicAllowance {
        spend_limit: proto_coins(spend_limit),
        expiration: expiration.as_ref().map(proto_timestamp),
    }
}

/// Creates a MsgGrantAllowance message
pub fn grant_allowance_msg(
    granter: &str,
    grantee: &str,
    allowance: &Allowance,
) -> Result<Msg, MsgGenError> {
    let (allowance_any, allowance_json) = match allowance {
        Allowance::Basic {
            spend_limit,
            expiration,
        } => (
            Any {
                type_url: BASIC_ALLOWANCE_TYPE_URL.to_string(),
                value: basic_allowance(spend_limit, expiration).encode_to_vec(),
            },
            json!({
                "@type": BASIC_ALLOWANCE_TYPE_URL,
                "spend_limit": spend_limit,
                "expiration": expiration,
            }),
        ),
        Allowance::Periodic {
            spend_limit,
            expiration,
            period,
            period_spend_limit,
        } => {
            if period.num_seconds() <= 0 {
                return Err(MsgGenError::InvalidPeriod);
            }
            let periodic = PeriodicAllowance {
                basic: Some(basic_allowance(spend_limit, expiration)),
                period: Some(prost_types::Duration {
                    seconds: period.num_seconds(),
                    nanos: 0,
                }),
                period_spend_limit: proto_coins(period_spend_limit),
                period_can_spend: proto_coins(period_spend_limit),
                period_reset: None,
            };
            (
                Any {
                    type_url: PERIODIC_ALLOWANCE_TYPE_URL.to_string(),
                    value: periodic.encode_to_vec(),
                },
                json!({
                    "@type": PERIODIC_ALLOWANCE_TYPE_URL,
                    "basic": {
                        "spend_limit": spend_limit,
                        "expiration": expiration,
                    },
                    "period": format!("{}s", period.num_seconds()),
                    "period_spend_limit": period_spend_limit,
                }),
            )
        }
    };

    let msg = MsgGrantAllowance {
        granter: granter.to_string(),
        grantee: grantee.to_string(),
        allowance: Some(allowance_any),
    };

    Ok(Msg::new(
        MSG_GRANT_ALLOWANCE_TYPE_URL,
        &msg,
        json!({
            "granter": granter,
            "grantee": grantee,
            "allowance": allowance_json,
        }),
    ))
}

pub fn send_msg(from: &str, to: &str, amount: &[Coin]) -> Msg {
    let msg = MsgSend {
        from_address: from.to_string(),
        to_address: to.to_string(),
        amount: proto_coins(amount),
    };

    Msg::new(
        MSG_SEND_TYPE_URL,
        &msg,
        json!({
            "from_address": from,
            "to_address": to,
            "amount": amount,
        }),
    )
}

pub fn delegate_msg(delegator: &str, validator: &str, amount: &Coin) -> Msg {
    let msg = MsgDelegate {
        delegator_address: delegator.to_string(),
        validator_address: validator.to_string(),
        amount: Some(proto_coin(amount)),
    };

    Msg::new(
        MSG_DELEGATE_TYPE_URL,
        &msg,
        json!({
            "delegator_address": delegator,
            "validator_address": validator,
            "amount": amount,
        }),
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteOption {
    Yes = 1,
    Abstain = 2,
    No = 3,
    NoWithVeto = 4,
}

impl FromStr for VoteOption {
    type Err = MsgGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yes" => Ok(VoteOption::Yes),
            "abstain" => Ok(VoteOption::Abstain),
            "no" => Ok(VoteOption::No),
            "no_with_veto" | "veto" => Ok(VoteOption::NoWithVeto),
            _ => Err(MsgGenError::InvalidVoteOption(s.to_string())),
        }
    }
}

impl VoteOption {
    fn as_str(&self) -> &'static str {
        match self {
            VoteOption::Yes => "VOTE_OPTION_YES",
            VoteOption::Abstain => "VOTE_OPTION_ABSTAIN",
            VoteOption::No => "VOTE_OPTION_NO",
            VoteOption::NoWithVeto => "VOTE_OPTION_NO_WITH_VETO",
        }
    }
}

pub fn vote_msg(proposal_id: u64, voter: &str, option: VoteOption) -> Msg {
    let msg = MsgVote {
        proposal_id,
        voter: voter.to_string(),
        option: option as i32,
    };

    Msg::new(
        MSG_VOTE_TYPE_URL,
        &msg,
        json!({
            "proposal_id": proposal_id.to_string(),
            "voter": voter,
            "option": option.as_str(),
        }),
    )
}

pub fn deposit_msg(proposal_id: u64, depositor: &str, amount: &[Coin]) -> Msg {
    let msg = MsgDeposit {
        proposal_id,
        depositor: depositor.to_string(),
        amount: proto_coins(amount),
    };

    Msg::new(
        MSG_DEPOSIT_TYPE_URL,
        &msg,
        json!({
            "proposal_id": proposal_id.to_string(),
            "depositor": depositor,
            "amount": amount,
        }),
    )
}
