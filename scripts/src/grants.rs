use std::env;
use std::sync::Arc;

use authz_client::{GrantFetcher, NetworkConfig, RestGrantQuerier};
use authz_grant_store::{GrantDirection, GrantStore};
use authz_utils::address::canonical_address;
use authz_utils::helpers::Expirable;
use chrono::Utc;
use parking_lot::RwLock;
use tokio::runtime::Runtime;

/// Prints the grants to and by `ADDRESS` on every network in `NETWORKS`
/// (comma separated chain ids, all built in networks by default)
pub fn main() -> anyhow::Result<()> {
    let rt = Runtime::new()?;
    dotenv::dotenv().ok();
    env_logger::init();

    let address = env::var("ADDRESS").map_err(|_| anyhow::anyhow!("ADDRESS must be set"))?;
    let networks = match env::var("NETWORKS") {
        Ok(chain_ids) => chain_ids
            .split(',')
            .map(|chain_id| NetworkConfig::from_env_for(chain_id.trim()))
            .collect::<Result<Vec<_>, _>>()?,
        Err(_) => NetworkConfig::known_chain_ids()
            .filter_map(NetworkConfig::known)
            .collect(),
    };

    let store = Arc::new(RwLock::new(GrantStore::new()));
    let fetcher = GrantFetcher::new(RestGrantQuerier::new(), store.clone());
    let refreshes = rt.block_on(fetcher.refresh_networks(&networks, &address));

    let now = Utc::now();
    for refresh in refreshes {
        println!("== {}", refresh.chain_id);
        for (direction, result) in [
            (GrantDirection::ToMe, refresh.grants_to_me),
            (GrantDirection::ByMe, refresh.grants_by_me),
        ] {
            match result {
                Ok(grants) => {
                    println!("  {:?}: {} grants", direction, grants.len());
                    for grant in grants {
                        let expires = grant
                            .expiration
                            .map(|e| e.to_rfc3339())
                            .unwrap_or_else(|| "never".to_string());
                        let status = if grant.is_expired(&now) {
                            " (expired)"
                        } else {
                            ""
                        };
                        println!(
                            "    {} -> {}: {} expires {}{}",
                            grant.granter,
                            grant.grantee,
                            grant.authorization.msg_type_url(),
                            expires,
                            status
                        );
                    }
                }
                Err(err) => println!("  {:?}: failed: {}", direction, err),
            }
        }
    }

    let store = store.read();
    println!("== granters across networks");
    for (granter, chains) in store.cross_network_index() {
        let on: Vec<String> = chains
            .iter()
            .filter(|(_, grants)| !grants.is_empty())
            .map(|(chain_id, grants)| format!("{} ({})", chain_id, grants.len()))
            .collect();
        let marker = if *granter == canonical_address(&address) {
            " (self)"
        } else {
            ""
        };
        println!("  {}{}: {}", granter, marker, on.join(", "));
    }

    Ok(())
}
