use authz_grant_spec::grants::{
    Authorization, StakeAuthorization, StakeAuthorizationPolicy, StakeAuthorizationType,
    StakeAuthorizationValidators,
};
use authz_grant_spec::{Grant, GrantRequest, RevokeRequest};
use bech32::{ToBase32, Variant};
use chrono::{Duration, TimeZone, Utc};
use cosmos_sdk_proto::cosmos::authz::v1beta1::{MsgExec, MsgGrant, MsgRevoke};
use cosmos_sdk_proto::cosmos::feegrant::v1beta1::MsgGrantAllowance;
use cosmos_sdk_proto::traits::Message;
use cosmwasm_std::coin;

use crate::address::{
    address_by_prefix, address_prefix, canonical_address, validate_address,
};
use crate::helpers::{format_number, parse_denom_amount, shorten, Expirable};
use crate::msg_gen::{
    authorization_any, delegate_msg, exec_msg, grant_allowance_msg, grant_msg, revoke_msg,
    vote_msg, Allowance, VoteOption, MSG_DELEGATE_TYPE_URL, MSG_GRANT_TYPE_URL,
};
use crate::{AddressError, MsgGenError};

fn test_address(prefix: &str) -> String {
    bech32::encode(prefix, [7u8; 20].to_base32(), Variant::Bech32).unwrap()
}

#[test]
fn translates_address_prefix() {
    let osmo = test_address("osmo");
    let cosmos = address_by_prefix(&osmo, "cosmos").unwrap();

    assert!(cosmos.starts_with("cosmos1"));
    assert_eq!(cosmos, test_address("cosmos"));
    assert_eq!(address_by_prefix(&cosmos, "osmo").unwrap(), osmo);
    assert_eq!(address_prefix(&cosmos).unwrap(), "cosmos");
}

#[test]
fn canonical_address_falls_back_to_raw() {
    assert_eq!(canonical_address(&test_address("juno")), test_address("cosmos"));
    assert_eq!(canonical_address("cosmos1a"), "cosmos1a");
}

#[test]
fn validates_address_prefix() {
    assert_eq!(validate_address(&test_address("osmo"), "osmo"), Ok(()));
    assert_eq!(
        validate_address(&test_address("osmo"), "juno"),
        Err(AddressError::InvalidPrefix("osmo".to_string()))
    );
    assert!(matches!(
        validate_address("not an address", "osmo"),
        Err(AddressError::InvalidBech32(_, _))
    ));
}

#[test]
fn grant_expiry() {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut grant = Grant {
        granter: "granter".to_string(),
        grantee: "grantee".to_string(),
        authorization: Authorization::generic("/cosmos.bank.v1beta1.MsgSend"),
        expiration: None,
    };
    assert!(grant.is_not_expired(&now));

    grant.expiration = Some(now - Duration::days(1));
    assert!(grant.is_expired(&now));

    grant.expiration = Some(now + Duration::days(1));
    assert!(grant.is_not_expired(&now));

    // still usable at the exact expiry instant
    grant.expiration = Some(now);
    assert!(grant.is_not_expired(&now));
}

#[test]
fn display_amounts() {
    assert_eq!(parse_denom_amount("1500000", 6), 1.5);
    assert_eq!(parse_denom_amount("garbage", 6), 0.0);
    assert_eq!(parse_denom_amount("1500000", u32::MAX), 0.0);
    assert_eq!(format_number(1234567.5), "1,234,567.5");
    assert_eq!(format_number(12.0), "12");
    assert_eq!(format_number(0.126), "0.13");
    assert_eq!(shorten("cosmosvaloper1abcdefgh", 10), "cosmosvalo...");
    assert_eq!(shorten("short", 10), "short");
}

#[test]
fn grant_msg_encodes_authorization() {
    let expiration = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    let request = GrantRequest {
        granter: "cosmos1granter".to_string(),
        grantee: "cosmos1grantee".to_string(),
        authorization: Authorization::generic("/cosmos.gov.v1beta1.MsgVote"),
        expiration: Some(expiration),
    };

    let msg = grant_msg(&request).unwrap();
    assert_eq!(msg.type_url, MSG_GRANT_TYPE_URL);
    assert_eq!(msg.any.type_url, MSG_GRANT_TYPE_URL);
    assert_eq!(msg.value["@type"], MSG_GRANT_TYPE_URL);
    assert_eq!(msg.value["grantee"], "cosmos1grantee");

    let decoded = MsgGrant::decode(msg.any.value.as_slice()).unwrap();
    assert_eq!(decoded.granter, "cosmos1granter");
    let grant = decoded.grant.unwrap();
    assert_eq!(
        grant.authorization.unwrap().type_url,
        "/cosmos.authz.v1beta1.GenericAuthorization"
    );
    assert_eq!(grant.expiration.unwrap().seconds, expiration.timestamp());
}

#[test]
fn stake_authorization_prefers_allow_list() {
    let authorization = Authorization::Stake(StakeAuthorization {
        max_tokens: Some(coin(10, "uatom")),
        allow_list: Some(StakeAuthorizationValidators {
            address: vec!["cosmosvaloper1a".to_string()],
        }),
        deny_list: Some(StakeAuthorizationValidators {
            address: vec!["cosmosvaloper1b".to_string()],
        }),
        authorization_type: StakeAuthorizationType::Delegate,
    });
    let with_both = authorization_any(&authorization).unwrap();

    let only_allow = authorization_any(&Authorization::Stake(StakeAuthorization::new(
        StakeAuthorizationType::Delegate,
        Some(coin(10, "uatom")),
        Some(StakeAuthorizationPolicy::AllowList(
            StakeAuthorizationValidators {
                address: vec!["cosmosvaloper1a".to_string()],
            },
        )),
    )))
    .unwrap();

    assert_eq!(with_both, only_allow);
}

#[test]
fn unsupported_authorization() {
    let authorization = Authorization::Unknown {
        type_url: "/custom.Authorization".to_string(),
        value: serde_json::json!({}),
    };
    assert_eq!(
        authorization_any(&authorization),
        Err(MsgGenError::UnsupportedAuthorization(
            "/custom.Authorization".to_string()
        ))
    );
}

#[test]
fn revoke_and_exec_msgs() {
    let revoke = revoke_msg(&RevokeRequest {
        granter: "granter".to_string(),
        grantee: "grantee".to_string(),
        msg_type_url: MSG_DELEGATE_TYPE_URL.to_string(),
    });
    let decoded = MsgRevoke::decode(revoke.any.value.as_slice()).unwrap();
    assert_eq!(decoded.msg_type_url, MSG_DELEGATE_TYPE_URL);

    let exec = exec_msg(
        "grantee",
        vec![delegate_msg("granter", "valoper", &coin(5, "uatom"))],
    );
    let decoded = MsgExec::decode(exec.any.value.as_slice()).unwrap();
    assert_eq!(decoded.grantee, "grantee");
    assert_eq!(decoded.msgs.len(), 1);
    assert_eq!(decoded.msgs[0].type_url, MSG_DELEGATE_TYPE_URL);
    assert_eq!(exec.value["msgs"][0]["validator_address"], "valoper");
}

#[test]
fn periodic_allowance_needs_positive_period() {
    let allowance = Allowance::Periodic {
        spend_limit: vec![],
        expiration: None,
        period: Duration::zero(),
        period_spend_limit: vec![coin(100, "uatom")],
    };
    assert_eq!(
        grant_allowance_msg("granter", "grantee", &allowance),
        Err(MsgGenError::InvalidPeriod)
    );

    let allowance = Allowance::Periodic {
        spend_limit: vec![],
        expiration: None,
        period: Duration::days(1),
        period_spend_limit: vec![coin(100, "uatom")],
    };
    let msg = grant_allowance_msg("granter", "grantee", &allowance).unwrap();
    let decoded = MsgGrantAllowance::decode(msg.any.value.as_slice()).unwrap();
    assert_eq!(
        decoded.allowance.unwrap().type_url,
        "/cosmos.feegrant.v1beta1.PeriodicAllowance"
    );
    assert_eq!(msg.value["allowance"]["period"], "86400s");
}

#[test]
fn vote_options() {
    assert_eq!("Yes".parse::<VoteOption>(), Ok(VoteOption::Yes));
    assert_eq!("veto".parse::<VoteOption>(), Ok(VoteOption::NoWithVeto));
    assert!("maybe".parse::<VoteOption>().is_err());
    assert_eq!(vote_msg(1, "voter", VoteOption::No).value["option"], "VOTE_OPTION_NO");
}
