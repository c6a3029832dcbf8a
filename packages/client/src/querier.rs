use async_trait::async_trait;
use authz_grant_spec::Grant;
use authz_grant_store::GrantDirection;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{ClientError, NetworkConfig};

/// `pagination.key` / `pagination.limit` of a cosmos REST query
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub key: Option<String>,
    pub limit: Option<u64>,
}

impl PageRequest {
    pub fn with_key(key: impl Into<String>) -> Self {
        PageRequest {
            key: Some(key.into()),
            limit: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PageResponse {
    #[serde(default)]
    pub next_key: Option<String>,
    #[serde(default)]
    pub total: Option<String>,
}

/// One page of the grants endpoint
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct GrantPage {
    #[serde(default)]
    pub grants: Vec<Grant>,
    #[serde(default)]
    pub pagination: Option<PageResponse>,
}

impl GrantPage {
    /// Key of the following page, `None` on the last one
    pub fn next_key(&self) -> Option<&str> {
        self.pagination
            .as_ref()
            .and_then(|p| p.next_key.as_deref())
            .filter(|key| !key.is_empty())
    }
}

/// Source of authz grants for an address on a network
#[async_trait]
pub trait GrantQuerier: Send + Sync {
    async fn grants(
        &self,
        network: &NetworkConfig,
        direction: GrantDirection,
        address: &str,
        pagination: Option<&PageRequest>,
    ) -> Result<GrantPage, ClientError>;
}

pub fn grants_url(network: &NetworkConfig, direction: GrantDirection, address: &str) -> String {
    let side = match direction {
        GrantDirection::ToMe => "grantee",
        GrantDirection::ByMe => "granter",
    };
    format!(
        "{}/cosmos/authz/v1beta1/grants/{}/{}",
        network.rest.trim_end_matches('/'),
        side,
        address
    )
}

/// Queries the chain's REST endpoint
#[derive(Clone, Debug, Default)]
pub struct RestGrantQuerier {
    client: Client,
}

impl RestGrantQuerier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        RestGrantQuerier { client }
    }
}

#[async_trait]
impl GrantQuerier for RestGrantQuerier {
    async fn grants(
        &self,
        network: &NetworkConfig,
        direction: GrantDirection,
        address: &str,
        pagination: Option<&PageRequest>,
    ) -> Result<GrantPage, ClientError> {
        let url = grants_url(network, direction, address);
        debug!("querying {}", url);

        let mut request = self.client.get(&url);
        if let Some(page) = pagination {
            if let Some(key) = &page.key {
                request = request.query(&[("pagination.key", key)]);
            }
            if let Some(limit) = page.limit {
                request = request.query(&[("pagination.limit", limit.to_string())]);
            }
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Transport {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
