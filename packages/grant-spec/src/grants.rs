use chrono::{DateTime, Utc};
use cosmwasm_std::Coin;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

pub const GENERIC_AUTHORIZATION_TYPE_URL: &str = "/cosmos.authz.v1beta1.GenericAuthorization";
pub const SEND_AUTHORIZATION_TYPE_URL: &str = "/cosmos.bank.v1beta1.SendAuthorization";
pub const STAKE_AUTHORIZATION_TYPE_URL: &str = "/cosmos.staking.v1beta1.StakeAuthorization";
pub const CONTRACT_EXECUTION_AUTHORIZATION_TYPE_URL: &str =
    "/cosmwasm.wasm.v1.ContractExecutionAuthorization";
pub const TRANSFER_AUTHORIZATION_TYPE_URL: &str =
    "/ibc.applications.transfer.v1.TransferAuthorization";

/// A single authz grant as returned by `/cosmos/authz/v1beta1/grants/...`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Grant {
    pub granter: String,
    pub grantee: String,
    pub authorization: Authorization,
    #[serde(default)]
    pub expiration: Option<DateTime<Utc>>,
}

/// The parameters needed to build a MsgGrant.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GrantRequest {
    pub granter: String,
    pub grantee: String,
    pub authorization: Authorization,
    pub expiration: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RevokeRequest {
    pub granter: String,
    pub grantee: String,
    pub msg_type_url: String,
}

impl From<GrantRequest> for RevokeRequest {
    fn from(val: GrantRequest) -> Self {
        RevokeRequest {
            msg_type_url: val.authorization.msg_type_url(),
            granter: val.granter,
            grantee: val.grantee,
        }
    }
}

impl From<Grant> for GrantRequest {
    fn from(grant: Grant) -> Self {
        GrantRequest {
            granter: grant.granter,
            grantee: grant.grantee,
            authorization: grant.authorization,
            expiration: grant.expiration,
        }
    }
}

/// The constraints attached to a grant, tagged on the wire by its `@type`.
///
/// Authorization kinds the client doesn't model are kept verbatim in
/// `Unknown` so they can still be indexed and shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Authorization {
    Generic(GenericAuthorization),
    Send(SendAuthorization),
    Stake(StakeAuthorization),
    ContractExecution(ContractExecutionAuthorization),
    Transfer(TransferAuthorization),
    Unknown { type_url: String, value: Value },
}

impl Authorization {
    pub fn generic(msg: impl Into<String>) -> Self {
        Authorization::Generic(GenericAuthorization { msg: msg.into() })
    }

    pub fn type_url(&self) -> &str {
        match self {
            Authorization::Generic(_) => GENERIC_AUTHORIZATION_TYPE_URL,
            Authorization::Send(_) => SEND_AUTHORIZATION_TYPE_URL,
            Authorization::Stake(_) => STAKE_AUTHORIZATION_TYPE_URL,
            Authorization::ContractExecution(_) => CONTRACT_EXECUTION_AUTHORIZATION_TYPE_URL,
            Authorization::Transfer(_) => TRANSFER_AUTHORIZATION_TYPE_URL,
            Authorization::Unknown { type_url, .. } => type_url,
        }
    }

    /// The message type url that this authorization lets the grantee execute
    pub fn msg_type_url(&self) -> String {
        match self {
            Authorization::Generic(GenericAuthorization { msg }) => msg.to_string(),
            Authorization::Send(_) => "/cosmos.bank.v1beta1.MsgSend".to_string(),
            Authorization::Stake(StakeAuthorization {
                authorization_type, ..
            }) => authorization_type.msg_type_url().to_string(),
            Authorization::ContractExecution(_) => {
                "/cosmwasm.wasm.v1.MsgExecuteContract".to_string()
            }
            Authorization::Transfer(_) => "/ibc.applications.transfer.v1.MsgTransfer".to_string(),
            Authorization::Unknown { type_url, .. } => type_url.to_string(),
        }
    }
}

#[derive(Serialize)]
struct Tagged<'a, T> {
    #[serde(rename = "@type")]
    type_url: &'a str,
    #[serde(flatten)]
    inner: &'a T,
}

impl Serialize for Authorization {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let type_url = self.type_url();
        match self {
            Authorization::Generic(inner) => Tagged { type_url, inner }.serialize(serializer),
            Authorization::Send(inner) => Tagged { type_url, inner }.serialize(serializer),
            Authorization::Stake(inner) => Tagged { type_url, inner }.serialize(serializer),
            Authorization::ContractExecution(inner) => {
                Tagged { type_url, inner }.serialize(serializer)
            }
            Authorization::Transfer(inner) => Tagged { type_url, inner }.serialize(serializer),
            Authorization::Unknown { value, .. } => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Authorization {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let type_url = value
            .get("@type")
            .and_then(Value::as_str)
            .ok_or_else(|| D::Error::missing_field("@type"))?
            .to_string();

        let authorization = match type_url.as_str() {
            GENERIC_AUTHORIZATION_TYPE_URL => {
                serde_json::from_value(value).map(Authorization::Generic)
            }
            SEND_AUTHORIZATION_TYPE_URL => serde_json::from_value(value).map(Authorization::Send),
            STAKE_AUTHORIZATION_TYPE_URL => serde_json::from_value(value).map(Authorization::Stake),
            CONTRACT_EXECUTION_AUTHORIZATION_TYPE_URL => {
                serde_json::from_value(value).map(Authorization::ContractExecution)
            }
            TRANSFER_AUTHORIZATION_TYPE_URL => {
                serde_json::from_value(value).map(Authorization::Transfer)
            }
            _ => return Ok(Authorization::Unknown { type_url, value }),
        };

        authorization.map_err(D::Error::custom)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GenericAuthorization {
    pub msg: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct SendAuthorization {
    #[serde(default)]
    pub spend_limit: Vec<Coin>,
    // an empty allow list permits any receiver address
    #[serde(default)]
    pub allow_list: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StakeAuthorization {
    #[serde(default)]
    pub max_tokens: Option<Coin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_list: Option<StakeAuthorizationValidators>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny_list: Option<StakeAuthorizationValidators>,
    pub authorization_type: StakeAuthorizationType,
}

impl StakeAuthorization {
    pub fn new(
        authorization_type: StakeAuthorizationType,
        max_tokens: Option<Coin>,
        validators: Option<StakeAuthorizationPolicy>,
    ) -> Self {
        let (allow_list, deny_list) = match validators {
            Some(StakeAuthorizationPolicy::AllowList(v)) => (Some(v), None),
            Some(StakeAuthorizationPolicy::DenyList(v)) => (None, Some(v)),
            None => (None, None),
        };
        StakeAuthorization {
            max_tokens,
            allow_list,
            deny_list,
            authorization_type,
        }
    }

    /// The validator policy, an allow list taking precedence over a deny list
    pub fn policy(&self) -> Option<StakeAuthorizationPolicy> {
        match (&self.allow_list, &self.deny_list) {
            (Some(allow), _) => Some(StakeAuthorizationPolicy::AllowList(allow.clone())),
            (None, Some(deny)) => Some(StakeAuthorizationPolicy::DenyList(deny.clone())),
            (None, None) => None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StakeAuthorizationType {
    /// AUTHORIZATION_TYPE_UNSPECIFIED specifies an unknown authorization type
    #[serde(rename = "AUTHORIZATION_TYPE_UNSPECIFIED")]
    Unspecified = 0,
    /// AUTHORIZATION_TYPE_DELEGATE defines an authorization type for Msg/Delegate
    #[serde(rename = "AUTHORIZATION_TYPE_DELEGATE")]
    Delegate = 1,
    /// AUTHORIZATION_TYPE_UNDELEGATE defines an authorization type for Msg/Undelegate
    #[serde(rename = "AUTHORIZATION_TYPE_UNDELEGATE")]
    Undelegate = 2,
    /// AUTHORIZATION_TYPE_REDELEGATE defines an authorization type for Msg/BeginRedelegate
    #[serde(rename = "AUTHORIZATION_TYPE_REDELEGATE")]
    Redelegate = 3,
}

impl StakeAuthorizationType {
    pub fn msg_type_url(&self) -> &'static str {
        match self {
            StakeAuthorizationType::Unspecified | StakeAuthorizationType::Delegate => {
                "/cosmos.staking.v1beta1.MsgDelegate"
            }
            StakeAuthorizationType::Undelegate => "/cosmos.staking.v1beta1.MsgUndelegate",
            StakeAuthorizationType::Redelegate => "/cosmos.staking.v1beta1.MsgBeginRedelegate",
        }
    }
}

/// Validators defines list of validator addresses.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct StakeAuthorizationValidators {
    pub address: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StakeAuthorizationPolicy {
    /// validator addresses the grantee may delegate to on the granter's behalf
    AllowList(StakeAuthorizationValidators),
    /// validator addresses the grantee may not delegate to
    DenyList(StakeAuthorizationValidators),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct ContractExecutionAuthorization {
    #[serde(default)]
    pub grants: Vec<ContractGrant>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ContractGrant {
    pub contract: String,
    /// Execution limit, itself an `@type` tagged object
    #[serde(default)]
    pub limit: Option<Value>,
    /// Payload filter, itself an `@type` tagged object
    #[serde(default)]
    pub filter: Option<Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct TransferAuthorization {
    #[serde(default)]
    pub allocations: Vec<TransferAllocation>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct TransferAllocation {
    pub source_port: String,
    pub source_channel: String,
    // spend limitation on the channel
    #[serde(default)]
    pub spend_limit: Vec<Coin>,
    #[serde(default)]
    pub allow_list: Vec<String>,
}
