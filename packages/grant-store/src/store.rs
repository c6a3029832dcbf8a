use std::collections::BTreeMap;

use authz_grant_spec::Grant;
use authz_utils::address::canonical_address;
use authz_utils::helpers::Expirable;
use chrono::{DateTime, Utc};
use log::debug;

use crate::state::{FetchState, NetworkGrantState, TxStatus};

/// canonical address -> chain id -> grants given to that address on the chain
pub type CrossNetworkIndex = BTreeMap<String, BTreeMap<String, Vec<Grant>>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GrantDirection {
    ToMe,
    ByMe,
}

impl GrantDirection {
    fn default_err_msg(&self) -> &'static str {
        match self {
            GrantDirection::ToMe => "An error occurred while fetching authz grants to me",
            GrantDirection::ByMe => "An error occurred while fetching authz grants by me",
        }
    }

    fn cancelled_err_msg(&self) -> &'static str {
        match self {
            GrantDirection::ToMe => "Fetching authz grants to me was cancelled",
            GrantDirection::ByMe => "Fetching authz grants by me was cancelled",
        }
    }
}

/// Issued when a fetch starts. Settling the fetch consumes the ticket so every
/// fetch is settled exactly once.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a started fetch has to be settled with its ticket"]
pub struct FetchTicket {
    chain_id: String,
    direction: GrantDirection,
    sequence: u64,
}

impl FetchTicket {
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn direction(&self) -> GrantDirection {
        self.direction
    }
}

/// Authz grants for every network the user has fetched.
///
/// Fetches go through [`GrantStore::begin_fetch`] and are settled with
/// [`GrantStore::fulfill`] or [`GrantStore::reject`].
#[derive(Debug, Default)]
pub struct GrantStore {
    authz_address: Option<String>,
    chains: BTreeMap<String, NetworkGrantState>,
    grants_to_me_in_flight: usize,
    grants_by_me_in_flight: usize,
    address_to_chain_authz: CrossNetworkIndex,
}

impl GrantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable_authz_mode(&mut self, address: impl Into<String>) {
        self.authz_address = Some(address.into());
    }

    pub fn exit_authz_mode(&mut self) {
        self.authz_address = None;
    }

    pub fn authz_mode_enabled(&self) -> bool {
        self.authz_address.is_some()
    }

    /// The granter the user is currently acting on behalf of
    pub fn authz_address(&self) -> Option<&str> {
        self.authz_address.as_deref()
    }

    /// Marks a fetch as pending and clears the data it will replace so that
    /// nothing stale is shown while it's in flight
    pub fn begin_fetch(&mut self, chain_id: &str, direction: GrantDirection) -> FetchTicket {
        *self.in_flight_mut(direction) += 1;

        let chain = self.chains.entry(chain_id.to_string()).or_default();
        let sequence = chain.next_request(direction);
        chain.set_pending(direction);
        chain.replace_grants(direction, vec![]);

        if direction == GrantDirection::ToMe {
            self.clear_cross_network_entries(chain_id);
        }

        FetchTicket {
            chain_id: chain_id.to_string(),
            direction,
            sequence,
        }
    }

    /// Replaces the network's grants with the fetched ones.
    /// Returns false when a newer fetch was started after this one, in which
    /// case the grants are dropped.
    pub fn fulfill(&mut self, ticket: FetchTicket, grants: Vec<Grant>) -> bool {
        let FetchTicket {
            chain_id,
            direction,
            sequence,
        } = ticket;
        self.settle_in_flight(direction);

        if !self.is_latest(&chain_id, direction, sequence) {
            debug!(
                "dropping stale {:?} grants for {} (request {})",
                direction, chain_id, sequence
            );
            return false;
        }

        if direction == GrantDirection::ToMe {
            self.clear_cross_network_entries(&chain_id);
            for grant in &grants {
                self.address_to_chain_authz
                    .entry(canonical_address(&grant.granter))
                    .or_default()
                    .entry(chain_id.clone())
                    .or_default()
                    .push(grant.clone());
            }
        }

        let chain = self.chains.entry(chain_id).or_default();
        chain.replace_grants(direction, grants);
        chain.set_loading(direction, FetchState::idle());
        true
    }

    /// Records a failed fetch. The grants of the last successful fetch are left
    /// as they are, only the status changes.
    pub fn reject(&mut self, ticket: FetchTicket, err_msg: Option<String>) -> bool {
        let FetchTicket {
            chain_id,
            direction,
            sequence,
        } = ticket;
        self.settle_in_flight(direction);

        if !self.is_latest(&chain_id, direction, sequence) {
            debug!(
                "ignoring stale {:?} failure for {} (request {})",
                direction, chain_id, sequence
            );
            return false;
        }

        let err_msg = err_msg
            .filter(|msg| !msg.is_empty())
            .unwrap_or_else(|| direction.default_err_msg().to_string());

        self.chains
            .entry(chain_id)
            .or_default()
            .set_loading(direction, FetchState::rejected(err_msg));
        true
    }

    /// Settles a fetch whose request was abandoned before it answered.
    /// The latest fetch of a network is marked rejected, older ones are stale.
    pub fn cancel(&mut self, ticket: FetchTicket) -> bool {
        let err_msg = ticket.direction.cancelled_err_msg().to_string();
        self.reject(ticket, Some(err_msg))
    }

    pub fn begin_tx(&mut self, chain_id: &str) {
        self.chains
            .entry(chain_id.to_string())
            .or_default()
            .set_tx(FetchState {
                status: TxStatus::Pending,
                err_msg: String::new(),
            });
    }

    pub fn settle_tx(&mut self, chain_id: &str, result: Result<(), String>) {
        let state = match result {
            Ok(()) => FetchState::idle(),
            Err(err_msg) => FetchState::rejected(err_msg),
        };
        self.chains
            .entry(chain_id.to_string())
            .or_default()
            .set_tx(state);
    }

    pub fn network(&self, chain_id: &str) -> Option<&NetworkGrantState> {
        self.chains.get(chain_id)
    }

    pub fn networks(&self) -> impl Iterator<Item = (&String, &NetworkGrantState)> {
        self.chains.iter()
    }

    pub fn grants_to_me(&self, chain_id: &str) -> &[Grant] {
        self.network(chain_id)
            .map(NetworkGrantState::grants_to_me)
            .unwrap_or_default()
    }

    pub fn grants_by_me(&self, chain_id: &str) -> &[Grant] {
        self.network(chain_id)
            .map(NetworkGrantState::grants_by_me)
            .unwrap_or_default()
    }

    pub fn cross_network_index(&self) -> &CrossNetworkIndex {
        &self.address_to_chain_authz
    }

    /// Grants given by `address` on every fetched network. The address may use
    /// any network's prefix.
    pub fn cross_network_grants(&self, address: &str) -> Option<&BTreeMap<String, Vec<Grant>>> {
        self.address_to_chain_authz.get(&canonical_address(address))
    }

    /// Granters on `chain_id` that currently let me execute `msg_type_url`
    pub fn granters_for_msg(
        &self,
        chain_id: &str,
        msg_type_url: &str,
        now: &DateTime<Utc>,
    ) -> Vec<&str> {
        self.network(chain_id)
            .map(|chain| {
                chain
                    .grants_to_me_by_granter()
                    .iter()
                    .filter(|(_, grants)| {
                        grants.iter().any(|grant| {
                            grant.is_not_expired(now)
                                && grant.authorization.msg_type_url() == msg_type_url
                        })
                    })
                    .map(|(granter, _)| granter.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn in_flight(&self, direction: GrantDirection) -> usize {
        match direction {
            GrantDirection::ToMe => self.grants_to_me_in_flight,
            GrantDirection::ByMe => self.grants_by_me_in_flight,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.grants_to_me_in_flight > 0 || self.grants_by_me_in_flight > 0
    }

    fn in_flight_mut(&mut self, direction: GrantDirection) -> &mut usize {
        match direction {
            GrantDirection::ToMe => &mut self.grants_to_me_in_flight,
            GrantDirection::ByMe => &mut self.grants_by_me_in_flight,
        }
    }

    fn settle_in_flight(&mut self, direction: GrantDirection) {
        let in_flight = self.in_flight_mut(direction);
        *in_flight = in_flight.saturating_sub(1);
    }

    fn is_latest(&self, chain_id: &str, direction: GrantDirection, sequence: u64) -> bool {
        self.chains
            .get(chain_id)
            .map_or(false, |chain| chain.latest_request(direction) == sequence)
    }

    // entries are emptied rather than removed so every address keeps a slot per network
    fn clear_cross_network_entries(&mut self, chain_id: &str) {
        for chains in self.address_to_chain_authz.values_mut() {
            chains.insert(chain_id.to_string(), vec![]);
        }
    }
}
