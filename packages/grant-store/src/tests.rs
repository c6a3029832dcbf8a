use authz_grant_spec::grants::{
    Authorization, StakeAuthorization, StakeAuthorizationType,
};
use authz_grant_spec::Grant;
use chrono::{Duration, TimeZone, Utc};

use crate::{GrantDirection, GrantStore, TxStatus};

const COSMOSHUB: &str = "cosmoshub-4";
const OSMOSIS: &str = "osmosis-1";

fn stake_auth() -> Authorization {
    Authorization::Stake(StakeAuthorization::new(
        StakeAuthorizationType::Delegate,
        None,
        None,
    ))
}

fn grant(granter: &str, grantee: &str, authorization: Authorization) -> Grant {
    Grant {
        granter: granter.to_string(),
        grantee: grantee.to_string(),
        authorization,
        expiration: None,
    }
}

#[test]
fn grants_to_me_example() {
    let mut store = GrantStore::new();

    let ticket = store.begin_fetch(COSMOSHUB, GrantDirection::ToMe);
    assert!(store.fulfill(ticket, vec![grant("cosmos1a", "cosmos1b", stake_auth())]));

    let chain = store.network(COSMOSHUB).unwrap();
    assert_eq!(chain.grants_to_me_by_granter()["cosmos1a"].len(), 1);
    assert_eq!(store.cross_network_index()["cosmos1a"][COSMOSHUB].len(), 1);
    assert_eq!(chain.loading(GrantDirection::ToMe).status, TxStatus::Idle);
    assert_eq!(store.in_flight(GrantDirection::ToMe), 0);
}

#[test]
fn granter_mapping_matches_grant_list() {
    let mut store = GrantStore::new();
    let grants = vec![
        grant("granter1", "me", Authorization::generic("/cosmos.gov.v1beta1.MsgVote")),
        grant("granter2", "me", stake_auth()),
        grant("granter1", "me", stake_auth()),
        grant("granter3", "me", Authorization::generic("/cosmos.bank.v1beta1.MsgSend")),
    ];

    let ticket = store.begin_fetch(COSMOSHUB, GrantDirection::ToMe);
    store.fulfill(ticket, grants.clone());

    let mapping = store.network(COSMOSHUB).unwrap().grants_to_me_by_granter();
    assert_eq!(
        mapping.keys().collect::<Vec<_>>(),
        vec!["granter1", "granter2", "granter3"]
    );
    assert_eq!(mapping["granter1"], vec![grants[0].clone(), grants[2].clone()]);
    assert_eq!(mapping["granter2"], vec![grants[1].clone()]);
    assert_eq!(store.grants_to_me(COSMOSHUB), grants.as_slice());
}

#[test]
fn pending_fetch_clears_cross_network_entries() {
    let mut store = GrantStore::new();

    let ticket = store.begin_fetch(COSMOSHUB, GrantDirection::ToMe);
    store.fulfill(ticket, vec![grant("cosmos1a", "cosmos1b", stake_auth())]);
    let ticket = store.begin_fetch(OSMOSIS, GrantDirection::ToMe);
    store.fulfill(ticket, vec![grant("cosmos1a", "osmo1b", stake_auth())]);

    let ticket = store.begin_fetch(COSMOSHUB, GrantDirection::ToMe);

    // only the refreshing network is emptied, the key stays
    let index = store.cross_network_index();
    assert!(index["cosmos1a"][COSMOSHUB].is_empty());
    assert_eq!(index["cosmos1a"][OSMOSIS].len(), 1);
    assert!(store.grants_to_me(COSMOSHUB).is_empty());
    assert!(store
        .network(COSMOSHUB)
        .unwrap()
        .grants_to_me_by_granter()
        .is_empty());
    assert_eq!(
        store
            .network(COSMOSHUB)
            .unwrap()
            .loading(GrantDirection::ToMe)
            .status,
        TxStatus::Pending
    );

    // a refresh that no longer has the grant leaves an empty slot behind
    store.fulfill(ticket, vec![]);
    assert!(store.cross_network_index()["cosmos1a"][COSMOSHUB].is_empty());
}

#[test]
fn rejected_fetch_keeps_state_and_sets_message() {
    let mut store = GrantStore::new();

    let ticket = store.begin_fetch(COSMOSHUB, GrantDirection::ByMe);
    store.fulfill(ticket, vec![grant("me", "friend", stake_auth())]);

    let ticket = store.begin_fetch(COSMOSHUB, GrantDirection::ByMe);
    assert!(store.reject(ticket, Some("connection refused".to_string())));

    let chain = store.network(COSMOSHUB).unwrap();
    let loading = chain.loading(GrantDirection::ByMe);
    assert_eq!(loading.status, TxStatus::Rejected);
    assert_eq!(loading.err_msg, "connection refused");
    assert_eq!(store.in_flight(GrantDirection::ByMe), 0);

    let ticket = store.begin_fetch(OSMOSIS, GrantDirection::ToMe);
    store.reject(ticket, None);
    assert_eq!(
        store
            .network(OSMOSIS)
            .unwrap()
            .loading(GrantDirection::ToMe)
            .err_msg,
        "An error occurred while fetching authz grants to me"
    );
}

#[test]
fn grants_by_me_mappings() {
    let mut store = GrantStore::new();
    let grants = vec![
        grant("me", "friend1", stake_auth()),
        grant("me", "friend2", stake_auth()),
        grant("me", "friend1", Authorization::generic("/cosmos.gov.v1beta1.MsgVote")),
    ];

    let ticket = store.begin_fetch(COSMOSHUB, GrantDirection::ByMe);
    store.fulfill(ticket, grants.clone());

    let chain = store.network(COSMOSHUB).unwrap();
    assert_eq!(chain.grants_by_me_by_granter()["me"], grants);
    assert_eq!(
        chain.grants_by_me_by_grantee()["friend1"],
        vec![grants[0].clone(), grants[2].clone()]
    );
    // by-me grants are never part of the cross network index
    assert!(store.cross_network_index().is_empty());
}

#[test]
fn in_flight_counter_settles_to_zero() {
    let mut store = GrantStore::new();

    let a = store.begin_fetch(COSMOSHUB, GrantDirection::ToMe);
    let b = store.begin_fetch(OSMOSIS, GrantDirection::ToMe);
    let c = store.begin_fetch(COSMOSHUB, GrantDirection::ToMe);
    let d = store.begin_fetch(OSMOSIS, GrantDirection::ByMe);
    assert_eq!(store.in_flight(GrantDirection::ToMe), 3);
    assert_eq!(store.in_flight(GrantDirection::ByMe), 1);
    assert!(store.is_loading());

    store.reject(b, None);
    store.fulfill(c, vec![]);
    // `a` is older than `c` and settles last
    store.fulfill(a, vec![grant("cosmos1a", "cosmos1b", stake_auth())]);
    assert_eq!(store.in_flight(GrantDirection::ToMe), 0);
    assert!(store.is_loading());

    store.fulfill(d, vec![]);
    assert_eq!(store.in_flight(GrantDirection::ByMe), 0);
    assert!(!store.is_loading());
}

#[test]
fn stale_responses_are_dropped() {
    let mut store = GrantStore::new();

    let first = store.begin_fetch(COSMOSHUB, GrantDirection::ToMe);
    let second = store.begin_fetch(COSMOSHUB, GrantDirection::ToMe);

    assert!(store.fulfill(second, vec![grant("cosmos1new", "me", stake_auth())]));
    assert!(!store.fulfill(first, vec![grant("cosmos1old", "me", stake_auth())]));

    let chain = store.network(COSMOSHUB).unwrap();
    assert_eq!(chain.grants_to_me().len(), 1);
    assert_eq!(chain.grants_to_me()[0].granter, "cosmos1new");
    assert!(!store.cross_network_index().contains_key("cosmos1old"));

    // a stale failure doesn't flag a fetch that succeeded afterwards
    let first = store.begin_fetch(COSMOSHUB, GrantDirection::ToMe);
    let second = store.begin_fetch(COSMOSHUB, GrantDirection::ToMe);
    store.fulfill(second, vec![]);
    assert!(!store.reject(first, Some("timeout".to_string())));
    assert_eq!(
        store
            .network(COSMOSHUB)
            .unwrap()
            .loading(GrantDirection::ToMe)
            .status,
        TxStatus::Idle
    );
}

#[test]
fn granters_for_msg_skips_expired() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let mut store = GrantStore::new();

    let mut expired = grant("granter2", "me", Authorization::generic("/cosmos.gov.v1beta1.MsgVote"));
    expired.expiration = Some(now - Duration::hours(1));

    let ticket = store.begin_fetch(COSMOSHUB, GrantDirection::ToMe);
    store.fulfill(
        ticket,
        vec![
            grant("granter1", "me", Authorization::generic("/cosmos.gov.v1beta1.MsgVote")),
            expired,
            grant("granter3", "me", stake_auth()),
        ],
    );

    assert_eq!(
        store.granters_for_msg(COSMOSHUB, "/cosmos.gov.v1beta1.MsgVote", &now),
        vec!["granter1"]
    );
    assert_eq!(
        store.granters_for_msg(COSMOSHUB, "/cosmos.staking.v1beta1.MsgDelegate", &now),
        vec!["granter3"]
    );
    assert!(store
        .granters_for_msg(OSMOSIS, "/cosmos.gov.v1beta1.MsgVote", &now)
        .is_empty());
}

#[test]
fn authz_mode_and_tx_status() {
    let mut store = GrantStore::new();
    assert!(!store.authz_mode_enabled());

    store.enable_authz_mode("cosmos1granter");
    assert_eq!(store.authz_address(), Some("cosmos1granter"));

    store.exit_authz_mode();
    assert_eq!(store.authz_address(), None);

    store.begin_tx(COSMOSHUB);
    assert_eq!(store.network(COSMOSHUB).unwrap().tx().status, TxStatus::Pending);
    store.settle_tx(COSMOSHUB, Err("out of gas".to_string()));
    let tx = store.network(COSMOSHUB).unwrap().tx();
    assert_eq!(tx.status, TxStatus::Rejected);
    assert_eq!(tx.err_msg, "out of gas");
}

#[test]
fn cancelled_fetch_settles_counter() {
    let mut store = GrantStore::new();

    let older = store.begin_fetch(COSMOSHUB, GrantDirection::ToMe);
    let latest = store.begin_fetch(COSMOSHUB, GrantDirection::ToMe);

    // only the counter moves for an older fetch
    assert!(!store.cancel(older));
    assert_eq!(store.in_flight(GrantDirection::ToMe), 1);

    assert!(store.cancel(latest));
    assert_eq!(store.in_flight(GrantDirection::ToMe), 0);
    assert!(!store.is_loading());

    let loading = store
        .network(COSMOSHUB)
        .unwrap()
        .loading(GrantDirection::ToMe)
        .clone();
    assert_eq!(loading.status, TxStatus::Rejected);
    assert_eq!(loading.err_msg, "Fetching authz grants to me was cancelled");
}
