use std::sync::Arc;

use async_trait::async_trait;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use spl_associated_token_account::get_associated_token_address;

use crate::common::types::SolanaRpcClient;
use crate::error::ClientResult;

/// Reads raw account data. `None` means the account does not exist.
#[async_trait]
pub trait AccountFetcher: Send + Sync {
    async fn fetch(&self, address: &Pubkey) -> ClientResult<Option<Vec<u8>>>;
}

/// Derives associated token accounts and checks whether they exist.
#[async_trait]
pub trait AssociatedAccountResolver: Send + Sync {
    fn resolve(&self, owner: &Pubkey, mint: &Pubkey) -> Pubkey {
        get_associated_token_address(owner, mint)
    }

    async fn exists(&self, address: &Pubkey) -> ClientResult<bool>;
}

/// [`AccountFetcher`] and [`AssociatedAccountResolver`] over the nonblocking RPC client
#[derive(Clone)]
pub struct RpcAccountFetcher {
    rpc: Arc<SolanaRpcClient>,
    commitment: CommitmentConfig,
}

impl RpcAccountFetcher {
    pub fn new(rpc: Arc<SolanaRpcClient>, commitment: CommitmentConfig) -> Self {
        Self { rpc, commitment }
    }
}

#[async_trait]
impl AccountFetcher for RpcAccountFetcher {
    async fn fetch(&self, address: &Pubkey) -> ClientResult<Option<Vec<u8>>> {
        let response = self.rpc.get_account_with_commitment(address, self.commitment).await?;
        Ok(response.value.map(|account| account.data))
    }
}

#[async_trait]
impl AssociatedAccountResolver for RpcAccountFetcher {
    async fn exists(&self, address: &Pubkey) -> ClientResult<bool> {
        Ok(self.fetch(address).await?.is_some())
    }
}
