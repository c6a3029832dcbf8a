use std::collections::VecDeque;

use async_trait::async_trait;
use authz_client::{BroadcastRequest, ClientError, NetworkConfig, TxBroadcaster};
use authz_tx_history::TxResponse;
use parking_lot::Mutex;

/// Records every request and answers from a queue. Once the queue is empty
/// every broadcast succeeds with hash `TX{n}`.
#[derive(Debug, Default)]
pub struct MockBroadcaster {
    responses: Mutex<VecDeque<Result<TxResponse, (u16, String)>>>,
    requests: Mutex<Vec<(String, BroadcastRequest)>>,
}

impl MockBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with(self, response: TxResponse) -> Self {
        self.responses.lock().push_back(Ok(response));
        self
    }

    /// Next broadcast fails before reaching the chain
    pub fn fail_with(self, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .push_back(Err((status, body.to_string())));
        self
    }

    /// (chain id, request) of every broadcast so far
    pub fn requests(&self) -> Vec<(String, BroadcastRequest)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl TxBroadcaster for MockBroadcaster {
    async fn sign_and_broadcast(
        &self,
        network: &NetworkConfig,
        request: &BroadcastRequest,
    ) -> Result<TxResponse, ClientError> {
        let count = {
            let mut requests = self.requests.lock();
            requests.push((network.chain_id.clone(), request.clone()));
            requests.len()
        };

        match self.responses.lock().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err((status, body))) => Err(ClientError::Transport { status, body }),
            None => Ok(TxResponse {
                code: 0,
                raw_log: "[]".to_string(),
                transaction_hash: format!("TX{}", count),
                height: 1,
                gas_used: 0,
                gas_wanted: request.gas_limit,
            }),
        }
    }
}
