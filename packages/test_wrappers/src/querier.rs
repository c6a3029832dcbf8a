use std::collections::BTreeMap;

use async_trait::async_trait;
use authz_client::{ClientError, GrantPage, GrantQuerier, NetworkConfig, PageRequest, PageResponse};
use authz_grant_spec::Grant;
use authz_grant_store::GrantDirection;
use parking_lot::Mutex;

type Key = (String, GrantDirection);

/// A query the mock received
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryCall {
    pub chain_id: String,
    pub direction: GrantDirection,
    pub address: String,
    pub page_key: Option<String>,
}

/// Serves canned grant pages per (chain id, direction).
/// Page `i` is requested with the key `page-{i}`.
#[derive(Debug, Default)]
pub struct MockGrantQuerier {
    pages: Mutex<BTreeMap<Key, Vec<GrantPage>>>,
    failures: Mutex<BTreeMap<Key, (u16, String)>>,
    calls: Mutex<Vec<QueryCall>>,
}

impl MockGrantQuerier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grants(self, chain_id: &str, direction: GrantDirection, grants: Vec<Grant>) -> Self {
        self.with_pages(chain_id, direction, vec![grants])
    }

    /// Splits the grants over several linked pages
    pub fn with_pages(
        self,
        chain_id: &str,
        direction: GrantDirection,
        pages: Vec<Vec<Grant>>,
    ) -> Self {
        let count = pages.len();
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, grants)| GrantPage {
                grants,
                pagination: Some(PageResponse {
                    next_key: (i + 1 < count).then(|| page_key(i + 1)),
                    total: Some(count.to_string()),
                }),
            })
            .collect();
        self.with_raw_pages(chain_id, direction, pages)
    }

    /// Pages are served as given, including their `next_key`
    pub fn with_raw_pages(
        self,
        chain_id: &str,
        direction: GrantDirection,
        pages: Vec<GrantPage>,
    ) -> Self {
        self.pages
            .lock()
            .insert((chain_id.to_string(), direction), pages);
        self
    }

    /// Answers with a non-success status and `body`
    pub fn with_failure(
        self,
        chain_id: &str,
        direction: GrantDirection,
        status: u16,
        body: &str,
    ) -> Self {
        self.set_failure(chain_id, direction, status, body);
        self
    }

    pub fn set_failure(&self, chain_id: &str, direction: GrantDirection, status: u16, body: &str) {
        self.failures
            .lock()
            .insert((chain_id.to_string(), direction), (status, body.to_string()));
    }

    pub fn clear_failure(&self, chain_id: &str, direction: GrantDirection) {
        self.failures
            .lock()
            .remove(&(chain_id.to_string(), direction));
    }

    pub fn calls(&self) -> Vec<QueryCall> {
        self.calls.lock().clone()
    }
}

/// Key the mock expects for page `index`
pub fn page_key(index: usize) -> String {
    format!("page-{}", index)
}

#[async_trait]
impl GrantQuerier for MockGrantQuerier {
    async fn grants(
        &self,
        network: &NetworkConfig,
        direction: GrantDirection,
        address: &str,
        pagination: Option<&PageRequest>,
    ) -> Result<GrantPage, ClientError> {
        let page_key = pagination.and_then(|p| p.key.clone());
        self.calls.lock().push(QueryCall {
            chain_id: network.chain_id.clone(),
            direction,
            address: address.to_string(),
            page_key: page_key.clone(),
        });

        let key = (network.chain_id.clone(), direction);
        if let Some((status, body)) = self.failures.lock().get(&key).cloned() {
            return Err(ClientError::Transport { status, body });
        }

        let index = match page_key {
            None => 0,
            Some(page_key) => page_key
                .strip_prefix("page-")
                .and_then(|i| i.parse().ok())
                .unwrap_or(usize::MAX),
        };

        Ok(self
            .pages
            .lock()
            .get(&key)
            .and_then(|pages| pages.get(index))
            .cloned()
            .unwrap_or_default())
    }
}
