pub mod accounts;
pub mod common;
pub mod constants;
pub mod error;
pub mod instruction;
pub mod trading;
pub mod utils;

use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;

use crate::accounts::{BondingCurveAccount, GlobalAccount};
use crate::common::account_fetcher::{
    AccountFetcher, AssociatedAccountResolver, RpcAccountFetcher,
};
use crate::common::happypump::{
    logs_subscription, EventDispatcher, EventEnvelope, EventKind, ListenerHandle,
};
use crate::common::metadata::{upload_or_placeholder, HttpMetadataUploader, MetadataUploader};
use crate::common::{CreateTokenMetadata, SdkConfig, SolanaRpcClient, SubscriptionHandle};
use crate::instruction::{HappyPumpInstructionEncoder, InstructionEncoder};
use crate::trading::happypump::common::{create_priority_fee_instructions, get_bonding_curve_pda};
use crate::trading::{TradePlan, TradeRequestBuilder};

pub use crate::error::{ClientError, ClientResult};

/// Client for the HappyPump bonding curve program.
///
/// Every trading method returns a [`TradePlan`]: the instructions to submit, with the compute
/// budget instructions from [`SdkConfig::priority_fee`] in front, and the accounts that must
/// sign. Signing and sending are left to the caller.
pub struct HappyPump {
    config: SdkConfig,
    rpc: Arc<SolanaRpcClient>,
    builder: TradeRequestBuilder,
    uploader: Arc<dyn MetadataUploader>,
    dispatcher: Arc<EventDispatcher>,
}

impl HappyPump {
    /// Creates a client backed by the RPC node and metadata service named in `config`.
    pub fn new(config: SdkConfig) -> Self {
        let rpc = Arc::new(SolanaRpcClient::new_with_commitment(
            config.rpc_url.clone(),
            config.commitment,
        ));
        let fetcher = Arc::new(RpcAccountFetcher::new(rpc.clone(), config.commitment));
        let encoder = Arc::new(HappyPumpInstructionEncoder::new(config.program_id));
        let uploader = Arc::new(HttpMetadataUploader::new(config.metadata_api_url.clone()));

        Self::with_collaborators(config, rpc, fetcher.clone(), fetcher, encoder, uploader)
    }

    /// Creates a client with caller-supplied collaborators.
    pub fn with_collaborators(
        config: SdkConfig,
        rpc: Arc<SolanaRpcClient>,
        fetcher: Arc<dyn AccountFetcher>,
        resolver: Arc<dyn AssociatedAccountResolver>,
        encoder: Arc<dyn InstructionEncoder>,
        uploader: Arc<dyn MetadataUploader>,
    ) -> Self {
        let builder = TradeRequestBuilder::new(config.program_id, fetcher, resolver, encoder);
        Self { config, rpc, builder, uploader, dispatcher: Arc::new(EventDispatcher::new()) }
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    /// Get the RPC client instance
    pub fn get_rpc(&self) -> &Arc<SolanaRpcClient> {
        &self.rpc
    }

    pub fn builder(&self) -> &TradeRequestBuilder {
        &self.builder
    }

    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }

    pub async fn get_global_account(&self) -> ClientResult<GlobalAccount> {
        self.builder.get_global_account().await
    }

    pub async fn get_bonding_curve_account(
        &self,
        mint: &Pubkey,
    ) -> ClientResult<Option<BondingCurveAccount>> {
        self.builder.get_bonding_curve_account(mint).await
    }

    pub fn get_bonding_curve_pda(&self, mint: &Pubkey) -> Pubkey {
        get_bonding_curve_pda(&self.config.program_id, mint)
    }

    fn with_priority_fee(&self, mut plan: TradePlan) -> TradePlan {
        plan.prepend(create_priority_fee_instructions(&self.config.priority_fee));
        plan
    }

    fn slippage(&self, slippage_basis_points: Option<u64>) -> u64 {
        slippage_basis_points.unwrap_or(self.config.default_slippage_basis_points)
    }

    /// Uploads the token metadata and builds the launch instructions.
    ///
    /// A failed upload does not abort the launch; a placeholder URI is used instead.
    pub async fn create(
        &self,
        creator: &Pubkey,
        mint: &Pubkey,
        metadata: &CreateTokenMetadata,
        trade_authority: Option<Pubkey>,
    ) -> ClientResult<TradePlan> {
        let uri = upload_or_placeholder(self.uploader.as_ref(), metadata).await;
        let plan = self
            .builder
            .create_plan(creator, mint, &metadata.name, &metadata.symbol, &uri, trade_authority)
            .await?;
        Ok(self.with_priority_fee(plan))
    }

    /// Launches a token and buys `buy_sol_amount` lamports worth of it in one transaction.
    ///
    /// # Arguments
    ///
    /// * `creator` - Creator and fee payer
    /// * `mint` - Address of the new mint, which must also sign
    /// * `metadata` - Token metadata to upload
    /// * `buy_sol_amount` - Lamports to spend on the initial buy; 0 skips the buy
    /// * `slippage_basis_points` - Slippage tolerance, the configured default when `None`
    /// * `trade_authority` - Optional delegate allowed to trade, which must also sign
    pub async fn create_and_buy(
        &self,
        creator: &Pubkey,
        mint: &Pubkey,
        metadata: &CreateTokenMetadata,
        buy_sol_amount: u64,
        slippage_basis_points: Option<u64>,
        trade_authority: Option<Pubkey>,
    ) -> ClientResult<TradePlan> {
        let uri = upload_or_placeholder(self.uploader.as_ref(), metadata).await;
        let plan = self
            .builder
            .create_and_buy_plan(
                creator,
                mint,
                &uri,
                &metadata.name,
                &metadata.symbol,
                buy_sol_amount,
                self.slippage(slippage_basis_points),
                trade_authority,
            )
            .await?;
        Ok(self.with_priority_fee(plan))
    }

    /// Execute a buy order for a specified token
    ///
    /// # Arguments
    ///
    /// * `buyer` - Buyer and fee payer
    /// * `mint` - The public key of the token mint to buy
    /// * `sol_amount` - Amount of SOL to spend, fees included (in lamports)
    /// * `slippage_basis_points` - Optional slippage tolerance in basis points (e.g., 100 = 1%)
    /// * `trade_authority` - Delegate that must co-sign when the curve requires one
    pub async fn buy(
        &self,
        buyer: &Pubkey,
        mint: &Pubkey,
        sol_amount: u64,
        slippage_basis_points: Option<u64>,
        trade_authority: Option<Pubkey>,
    ) -> ClientResult<TradePlan> {
        let plan = self
            .builder
            .buy_plan(
                buyer,
                mint,
                sol_amount,
                self.slippage(slippage_basis_points),
                trade_authority,
            )
            .await?;
        Ok(self.with_priority_fee(plan))
    }

    /// Execute a sell order for a specified token
    pub async fn sell(
        &self,
        seller: &Pubkey,
        mint: &Pubkey,
        token_amount: u64,
        slippage_basis_points: Option<u64>,
    ) -> ClientResult<TradePlan> {
        let plan = self
            .builder
            .sell_plan(seller, mint, token_amount, self.slippage(slippage_basis_points))
            .await?;
        Ok(self.with_priority_fee(plan))
    }

    pub fn set_bonding_curve_cfg(
        &self,
        user: &Pubkey,
        mint: &Pubkey,
        trade_authority: Option<Pubkey>,
    ) -> ClientResult<TradePlan> {
        let plan = self.builder.set_bonding_curve_cfg_plan(user, mint, trade_authority)?;
        Ok(self.with_priority_fee(plan))
    }

    pub fn add_event_listener<F>(&self, kind: EventKind, handler: F) -> ListenerHandle
    where
        F: Fn(EventEnvelope) + Send + Sync + 'static,
    {
        self.dispatcher.subscribe(kind, handler)
    }

    pub fn remove_event_listener(&self, handle: ListenerHandle) -> bool {
        self.dispatcher.unsubscribe(handle)
    }

    /// Streams program logs from the websocket endpoint into the registered listeners.
    pub async fn subscribe_logs(&self) -> ClientResult<SubscriptionHandle> {
        logs_subscription(
            &self.config.ws_url,
            self.config.program_id,
            self.config.commitment,
            self.dispatcher.clone(),
        )
        .await
    }
}
