use std::sync::Arc;

use authz_grant_spec::{Authorization, GrantRequest, RevokeRequest};
use authz_tx_history::{Transaction, TransactionLog, TxNotifier};
use authz_utils::address::{address_by_prefix, validate_address, CANONICAL_PREFIX};
use authz_utils::msg_gen::{grant_allowance_msg, grant_msg, revoke_msg, Allowance, Msg};
use chrono::{DateTime, Utc};
use cosmwasm_std::coin;
use log::{info, warn};

use crate::broadcaster::{BroadcastRequest, TxBroadcaster};
use crate::fetcher::SharedGrantStore;
use crate::{ClientError, NetworkConfig, GAS_FEE};

/// The signing account on a network and who pays its fees
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkContext {
    pub network: NetworkConfig,
    /// Signer address with the network's prefix
    pub address: String,
    /// Signer address with the `cosmos` prefix, history is kept under it
    pub cosmos_address: String,
    pub fee_granter: Option<String>,
}

impl NetworkContext {
    pub fn new(network: NetworkConfig, address: impl Into<String>) -> Result<Self, ClientError> {
        let address = address.into();
        validate_address(&address, &network.prefix)?;
        let cosmos_address = address_by_prefix(&address, CANONICAL_PREFIX)?;

        Ok(NetworkContext {
            network,
            address,
            cosmos_address,
            fee_granter: None,
        })
    }

    /// An empty granter means the signer pays
    pub fn with_fee_granter(mut self, fee_granter: impl Into<String>) -> Self {
        let fee_granter = fee_granter.into();
        self.fee_granter = Some(fee_granter).filter(|granter| !granter.is_empty());
        self
    }
}

/// Builds, broadcasts and records authz and fee grant transactions
pub struct GrantTxSubmitter<B> {
    broadcaster: B,
    store: SharedGrantStore,
    history: Arc<dyn TransactionLog>,
    notifier: Arc<dyn TxNotifier>,
}

impl<B: TxBroadcaster> GrantTxSubmitter<B> {
    pub fn new(
        broadcaster: B,
        store: SharedGrantStore,
        history: Arc<dyn TransactionLog>,
        notifier: Arc<dyn TxNotifier>,
    ) -> Self {
        GrantTxSubmitter {
            broadcaster,
            store,
            history,
            notifier,
        }
    }

    pub fn broadcaster(&self) -> &B {
        &self.broadcaster
    }

    /// Grants `grantee` the authorization from the context's account.
    /// Returns the transaction hash.
    pub async fn create_grant(
        &self,
        grantee: &str,
        authorization: Authorization,
        expiration: Option<DateTime<Utc>>,
        ctx: &NetworkContext,
    ) -> Result<String, ClientError> {
        let msg = self.build(ctx, || {
            validate_address(grantee, &ctx.network.prefix)?;
            Ok(grant_msg(&GrantRequest {
                granter: ctx.address.clone(),
                grantee: grantee.to_string(),
                authorization,
                expiration,
            })?)
        })?;
        self.submit(vec![msg], ctx).await
    }

    /// Revokes the grant of `msg_type_url` given to `grantee`
    pub async fn revoke_grant(
        &self,
        grantee: &str,
        msg_type_url: &str,
        ctx: &NetworkContext,
    ) -> Result<String, ClientError> {
        let msg = self.build(ctx, || {
            validate_address(grantee, &ctx.network.prefix)?;
            Ok(revoke_msg(&RevokeRequest {
                granter: ctx.address.clone(),
                grantee: grantee.to_string(),
                msg_type_url: msg_type_url.to_string(),
            }))
        })?;
        self.submit(vec![msg], ctx).await
    }

    /// Lets `grantee` pay fees out of the context's account
    pub async fn grant_allowance(
        &self,
        grantee: &str,
        allowance: &Allowance,
        ctx: &NetworkContext,
    ) -> Result<String, ClientError> {
        let msg = self.build(ctx, || {
            validate_address(grantee, &ctx.network.prefix)?;
            Ok(grant_allowance_msg(&ctx.address, grantee, allowance)?)
        })?;
        self.submit(vec![msg], ctx).await
    }

    // invalid input never reaches the chain but is reported like any failed tx
    fn build(
        &self,
        ctx: &NetworkContext,
        build: impl FnOnce() -> Result<Msg, ClientError>,
    ) -> Result<Msg, ClientError> {
        build().map_err(|err| {
            self.store
                .write()
                .settle_tx(&ctx.network.chain_id, Err(err.to_string()));
            err
        })
    }

    async fn submit(&self, msgs: Vec<Msg>, ctx: &NetworkContext) -> Result<String, ClientError> {
        let chain_id = &ctx.network.chain_id;
        self.store.write().begin_tx(chain_id);

        let fee = coin(ctx.network.fee_amount, &ctx.network.denom);
        let request = BroadcastRequest {
            msgs,
            fee: fee.clone(),
            gas_limit: GAS_FEE,
            memo: String::new(),
            fee_granter: ctx.fee_granter.clone(),
        };

        let result = match self.broadcaster.sign_and_broadcast(&ctx.network, &request).await {
            Ok(res) if res.is_ok() => Ok(res),
            Ok(res) => Err(ClientError::ChainRejection {
                code: res.code,
                raw_log: res.raw_log,
            }),
            Err(err) => Err(err),
        };

        let res = match result {
            Ok(res) => res,
            Err(err) => {
                warn!("transaction on {} failed: {}", chain_id, err);
                self.store.write().settle_tx(chain_id, Err(err.to_string()));
                return Err(err);
            }
        };

        let hash = res.transaction_hash.clone();
        info!("transaction {} succeeded on {}", hash, chain_id);

        let tx = Transaction::new(
            res,
            &request.msgs,
            vec![fee],
            request.memo,
            chain_id.clone(),
            ctx.cosmos_address.clone(),
        );
        self.history
            .add_transactions(chain_id, &ctx.cosmos_address, vec![tx.clone()]);
        self.notifier.set_tx_and_hash(tx, hash.clone());
        self.store.write().settle_tx(chain_id, Ok(()));

        Ok(hash)
    }
}
