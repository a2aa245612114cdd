//! Chain reader for spin transaction receipts

use std::sync::Arc;

use ethers::providers::{Http, Middleware, Provider, ProviderError};
use ethers::types::H256;

use crate::blockchain::types::SpinReceipt;

/// Read-only RPC client for the target network
#[derive(Clone)]
pub struct ChainClient {
    provider: Arc<Provider<Http>>,
    rpc_url: String,
}

impl ChainClient {
    pub fn new(rpc_url: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let provider = Provider::<Http>::try_from(rpc_url)?;
        Ok(Self {
            provider: Arc::new(provider),
            rpc_url: rpc_url.to_string(),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Fetch the confirmation state for a spin transaction.
    ///
    /// `Ok(None)` means the transaction is unmined or unknown — a transient
    /// condition the caller retries. `Err` is an RPC failure, also
    /// transient. The raw receipt is converted at this boundary.
    pub async fn spin_receipt(&self, tx_hash: H256) -> Result<Option<SpinReceipt>, ProviderError> {
        let receipt = self.provider.get_transaction_receipt(tx_hash).await?;
        Ok(receipt.map(SpinReceipt::from))
    }
}
