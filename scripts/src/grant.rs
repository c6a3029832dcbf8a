use std::env;
use std::sync::Arc;

use authz_client::{
    GrantTxSubmitter, NetworkConfig, NetworkContext, RestBroadcaster,
};
use authz_grant_spec::Authorization;
use authz_grant_store::GrantStore;
use authz_tx_history::{LatestTx, TransactionHistory};
use chrono::{Duration, Utc};
use log::info;
use parking_lot::RwLock;
use tokio::runtime::Runtime;

/// Grants `GRANTEE` a generic authorization for `MSG_TYPE_URL` from the account
/// of `PRIVATE_KEY` on `CHAIN_ID`. `EXPIRATION_DAYS` and `FEE_GRANTER` are optional.
pub fn main() -> anyhow::Result<()> {
    let rt = Runtime::new()?;
    dotenv::dotenv().ok();
    env_logger::init();

    let network = NetworkConfig::from_env()?;
    let broadcaster = RestBroadcaster::from_hex(&var("PRIVATE_KEY")?)?;
    let grantee = var("GRANTEE")?;
    let msg_type_url = var("MSG_TYPE_URL")?;
    let expiration = match env::var("EXPIRATION_DAYS") {
        Ok(days) => Some(Utc::now() + Duration::days(days.parse()?)),
        Err(_) => None,
    };

    let address = broadcaster.address(&network.prefix)?;
    let mut ctx = NetworkContext::new(network, address)?;
    if let Ok(fee_granter) = env::var("FEE_GRANTER") {
        ctx = ctx.with_fee_granter(fee_granter);
    }
    info!("granting from {} on {}", ctx.address, ctx.network.chain_id);

    let history = Arc::new(TransactionHistory::new());
    let latest = Arc::new(LatestTx::new());
    let submitter = GrantTxSubmitter::new(
        broadcaster,
        Arc::new(RwLock::new(GrantStore::new())),
        history.clone(),
        latest.clone(),
    );

    let hash = rt.block_on(submitter.create_grant(
        &grantee,
        Authorization::generic(msg_type_url),
        expiration,
        &ctx,
    ))?;
    println!("grant tx hash: {}", hash);

    for tx in history.transactions(&ctx.network.chain_id, &ctx.cosmos_address) {
        for summary in tx.summaries(&ctx.network.denom, ctx.network.decimals) {
            println!("  {}", summary);
        }
    }

    Ok(())
}

fn var(name: &str) -> anyhow::Result<String> {
    env::var(name).map_err(|_| anyhow::anyhow!("{} must be set", name))
}
