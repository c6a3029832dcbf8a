use std::collections::BTreeMap;

use authz_grant_spec::Grant;

use crate::store::GrantDirection;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TxStatus {
    #[default]
    Init,
    Pending,
    Idle,
    Rejected,
}

/// Status of the latest request plus the message to show if it failed
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FetchState {
    pub status: TxStatus,
    pub err_msg: String,
}

impl FetchState {
    pub(crate) fn idle() -> Self {
        FetchState {
            status: TxStatus::Idle,
            err_msg: String::new(),
        }
    }

    pub(crate) fn rejected(err_msg: impl Into<String>) -> Self {
        FetchState {
            status: TxStatus::Rejected,
            err_msg: err_msg.into(),
        }
    }
}

/// Grants for a single network.
///
/// The address mappings are derived from the grant lists and are rebuilt
/// together with them, never patched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetworkGrantState {
    grants_to_me: Vec<Grant>,
    grants_by_me: Vec<Grant>,
    grants_to_me_by_granter: BTreeMap<String, Vec<Grant>>,
    grants_by_me_by_granter: BTreeMap<String, Vec<Grant>>,
    grants_by_me_by_grantee: BTreeMap<String, Vec<Grant>>,
    grants_to_me_loading: FetchState,
    grants_by_me_loading: FetchState,
    tx: FetchState,
    latest_to_me_request: u64,
    latest_by_me_request: u64,
}

impl NetworkGrantState {
    pub fn grants_to_me(&self) -> &[Grant] {
        &self.grants_to_me
    }

    pub fn grants_by_me(&self) -> &[Grant] {
        &self.grants_by_me
    }

    /// granter -> grants given to me by that granter
    pub fn grants_to_me_by_granter(&self) -> &BTreeMap<String, Vec<Grant>> {
        &self.grants_to_me_by_granter
    }

    /// granter -> grants given by me, keyed by my own address
    pub fn grants_by_me_by_granter(&self) -> &BTreeMap<String, Vec<Grant>> {
        &self.grants_by_me_by_granter
    }

    /// grantee -> grants given by me to that grantee
    pub fn grants_by_me_by_grantee(&self) -> &BTreeMap<String, Vec<Grant>> {
        &self.grants_by_me_by_grantee
    }

    pub fn loading(&self, direction: GrantDirection) -> &FetchState {
        match direction {
            GrantDirection::ToMe => &self.grants_to_me_loading,
            GrantDirection::ByMe => &self.grants_by_me_loading,
        }
    }

    pub fn tx(&self) -> &FetchState {
        &self.tx
    }

    pub(crate) fn set_tx(&mut self, tx: FetchState) {
        self.tx = tx;
    }

    pub(crate) fn set_loading(&mut self, direction: GrantDirection, state: FetchState) {
        match direction {
            GrantDirection::ToMe => self.grants_to_me_loading = state,
            GrantDirection::ByMe => self.grants_by_me_loading = state,
        }
    }

    pub(crate) fn set_pending(&mut self, direction: GrantDirection) {
        match direction {
            GrantDirection::ToMe => self.grants_to_me_loading.status = TxStatus::Pending,
            GrantDirection::ByMe => self.grants_by_me_loading.status = TxStatus::Pending,
        }
    }

    /// Bumps and returns the sequence number of the latest request in `direction`
    pub(crate) fn next_request(&mut self, direction: GrantDirection) -> u64 {
        let latest = match direction {
            GrantDirection::ToMe => &mut self.latest_to_me_request,
            GrantDirection::ByMe => &mut self.latest_by_me_request,
        };
        *latest += 1;
        *latest
    }

    pub(crate) fn latest_request(&self, direction: GrantDirection) -> u64 {
        match direction {
            GrantDirection::ToMe => self.latest_to_me_request,
            GrantDirection::ByMe => self.latest_by_me_request,
        }
    }

    pub(crate) fn replace_grants(&mut self, direction: GrantDirection, grants: Vec<Grant>) {
        match direction {
            GrantDirection::ToMe => {
                self.grants_to_me_by_granter = group_by(&grants, |g| &g.granter);
                self.grants_to_me = grants;
            }
            GrantDirection::ByMe => {
                self.grants_by_me_by_granter = group_by(&grants, |g| &g.granter);
                self.grants_by_me_by_grantee = group_by(&grants, |g| &g.grantee);
                self.grants_by_me = grants;
            }
        }
    }
}

/// Groups grants under the address picked by `key`, keeping their order
pub fn group_by<F>(grants: &[Grant], key: F) -> BTreeMap<String, Vec<Grant>>
where
    F: Fn(&Grant) -> &String,
{
    grants.iter().fold(BTreeMap::new(), |mut acc, grant| {
        acc.entry(key(grant).clone())
            .or_insert_with(Vec::new)
            .push(grant.clone());
        acc
    })
}
