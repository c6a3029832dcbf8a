use std::collections::HashSet;
use std::sync::Arc;

use authz_grant_spec::Grant;
use authz_grant_store::{FetchTicket, GrantDirection, GrantStore};
use authz_utils::address::address_by_prefix;
use futures::future::join_all;
use log::{debug, warn};
use parking_lot::RwLock;

use crate::querier::{GrantQuerier, PageRequest};
use crate::{ClientError, NetworkConfig};

/// Store shared between the fetcher, the submitter and whatever renders it
pub type SharedGrantStore = Arc<RwLock<GrantStore>>;

/// Result of refreshing both directions on one network
#[derive(Debug)]
pub struct NetworkRefresh {
    pub chain_id: String,
    pub grants_to_me: Result<Vec<Grant>, ClientError>,
    pub grants_by_me: Result<Vec<Grant>, ClientError>,
}

/// Loads grants from a [`GrantQuerier`] and records every fetch in the store
pub struct GrantFetcher<Q> {
    querier: Q,
    store: SharedGrantStore,
}

impl<Q: GrantQuerier> GrantFetcher<Q> {
    pub fn new(querier: Q, store: SharedGrantStore) -> Self {
        GrantFetcher { querier, store }
    }

    pub fn store(&self) -> &SharedGrantStore {
        &self.store
    }

    pub fn querier(&self) -> &Q {
        &self.querier
    }

    /// Grants where `address` is the grantee, a single page
    pub async fn fetch_grants_to_me(
        &self,
        network: &NetworkConfig,
        address: &str,
        pagination: Option<&PageRequest>,
    ) -> Result<Vec<Grant>, ClientError> {
        self.fetch_page(network, GrantDirection::ToMe, address, pagination)
            .await
    }

    /// Grants where `address` is the granter, a single page
    pub async fn fetch_grants_by_me(
        &self,
        network: &NetworkConfig,
        address: &str,
        pagination: Option<&PageRequest>,
    ) -> Result<Vec<Grant>, ClientError> {
        self.fetch_page(network, GrantDirection::ByMe, address, pagination)
            .await
    }

    /// Every page of grants where `address` is the grantee
    pub async fn fetch_all_grants_to_me(
        &self,
        network: &NetworkConfig,
        address: &str,
    ) -> Result<Vec<Grant>, ClientError> {
        self.fetch_all(network, GrantDirection::ToMe, address).await
    }

    /// Every page of grants where `address` is the granter
    pub async fn fetch_all_grants_by_me(
        &self,
        network: &NetworkConfig,
        address: &str,
    ) -> Result<Vec<Grant>, ClientError> {
        self.fetch_all(network, GrantDirection::ByMe, address).await
    }

    /// Refreshes both directions on every network at once. `address` may use
    /// any prefix, it's re-encoded for each network.
    pub async fn refresh_networks(
        &self,
        networks: &[NetworkConfig],
        address: &str,
    ) -> Vec<NetworkRefresh> {
        let refreshes = networks.iter().map(|network| async move {
            match address_by_prefix(address, &network.prefix) {
                Ok(network_address) => {
                    let (grants_to_me, grants_by_me) = futures::join!(
                        self.fetch_all_grants_to_me(network, &network_address),
                        self.fetch_all_grants_by_me(network, &network_address),
                    );
                    NetworkRefresh {
                        chain_id: network.chain_id.clone(),
                        grants_to_me,
                        grants_by_me,
                    }
                }
                Err(err) => {
                    warn!("can't refresh {}: {}", network.chain_id, err);
                    NetworkRefresh {
                        chain_id: network.chain_id.clone(),
                        grants_to_me: self.fail(network, GrantDirection::ToMe, err.clone().into()),
                        grants_by_me: self.fail(network, GrantDirection::ByMe, err.into()),
                    }
                }
            }
        });

        join_all(refreshes).await
    }

    async fn fetch_page(
        &self,
        network: &NetworkConfig,
        direction: GrantDirection,
        address: &str,
        pagination: Option<&PageRequest>,
    ) -> Result<Vec<Grant>, ClientError> {
        let fetch = InFlightFetch::begin(&self.store, &network.chain_id, direction);

        let result = self
            .querier
            .grants(network, direction, address, pagination)
            .await
            .map(|page| page.grants);

        fetch.settle(result)
    }

    async fn fetch_all(
        &self,
        network: &NetworkConfig,
        direction: GrantDirection,
        address: &str,
    ) -> Result<Vec<Grant>, ClientError> {
        let fetch = InFlightFetch::begin(&self.store, &network.chain_id, direction);
        let result = self.collect_pages(network, direction, address).await;
        fetch.settle(result)
    }

    async fn collect_pages(
        &self,
        network: &NetworkConfig,
        direction: GrantDirection,
        address: &str,
    ) -> Result<Vec<Grant>, ClientError> {
        let mut grants = vec![];
        let mut seen_keys = HashSet::new();
        let mut next_page: Option<PageRequest> = None;

        loop {
            let page = self
                .querier
                .grants(network, direction, address, next_page.as_ref())
                .await?;
            let next_key = page.next_key().map(str::to_string);
            grants.extend(page.grants);

            match next_key {
                Some(key) if seen_keys.insert(key.clone()) => {
                    next_page = Some(PageRequest::with_key(key));
                }
                Some(key) => {
                    warn!(
                        "{} returned next_key {} twice, stopping pagination",
                        network.chain_id, key
                    );
                    break;
                }
                None => break,
            }
        }

        debug!(
            "fetched {} {:?} grants on {}",
            grants.len(),
            direction,
            network.chain_id
        );
        Ok(grants)
    }

    fn fail(
        &self,
        network: &NetworkConfig,
        direction: GrantDirection,
        err: ClientError,
    ) -> Result<Vec<Grant>, ClientError> {
        InFlightFetch::begin(&self.store, &network.chain_id, direction).settle(Err(err))
    }
}

/// A started fetch. Dropping it unsettled, e.g. when the request future is
/// dropped by a timeout, cancels the fetch in the store.
struct InFlightFetch<'a> {
    store: &'a SharedGrantStore,
    ticket: Option<FetchTicket>,
}

impl<'a> InFlightFetch<'a> {
    fn begin(store: &'a SharedGrantStore, chain_id: &str, direction: GrantDirection) -> Self {
        let ticket = store.write().begin_fetch(chain_id, direction);
        InFlightFetch {
            store,
            ticket: Some(ticket),
        }
    }

    fn settle(mut self, result: Result<Vec<Grant>, ClientError>) -> Result<Vec<Grant>, ClientError> {
        let Some(ticket) = self.ticket.take() else {
            return result;
        };

        let mut store = self.store.write();
        match result {
            Ok(grants) => {
                store.fulfill(ticket, grants.clone());
                Ok(grants)
            }
            Err(err) => {
                warn!(
                    "fetching {:?} grants on {} failed: {}",
                    ticket.direction(),
                    ticket.chain_id(),
                    err
                );
                store.reject(ticket, Some(err.to_string()));
                Err(err)
            }
        }
    }
}

impl Drop for InFlightFetch<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            debug!(
                "{:?} fetch on {} dropped before it settled",
                ticket.direction(),
                ticket.chain_id()
            );
            self.store.write().cancel(ticket);
        }
    }
}
