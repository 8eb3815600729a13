//! Turns trade intents into fully bound instruction plans.
//!
//! Every flow fetches fresh account state, prices it with the on-chain formulas, applies the
//! slippage bound and hands the result to the instruction encoder. Nothing is cached and no
//! error is swallowed.

use std::sync::Arc;

use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use spl_associated_token_account::instruction::create_associated_token_account;

use crate::accounts::{BondingCurveAccount, GlobalAccount};
use crate::common::account_fetcher::{AccountFetcher, AssociatedAccountResolver};
use crate::constants::happypump::accounts;
use crate::error::{ClientError, ClientResult};
use crate::instruction::{InstructionEncoder, InstructionRequest};
use crate::trading::core::params::{
    BuyRequest, CreateRequest, SellRequest, SetBondingCurveCfgRequest, TradePlan,
};
use crate::trading::happypump::common::{get_bonding_curve_pda, get_global_pda};
use crate::utils::calc::common::{
    calculate_with_slippage_buy, calculate_with_slippage_sell, compute_fee, slippage_bound_to_u64,
};

#[derive(Clone)]
pub struct TradeRequestBuilder {
    program_id: Pubkey,
    fetcher: Arc<dyn AccountFetcher>,
    resolver: Arc<dyn AssociatedAccountResolver>,
    encoder: Arc<dyn InstructionEncoder>,
}

impl TradeRequestBuilder {
    pub fn new(
        program_id: Pubkey,
        fetcher: Arc<dyn AccountFetcher>,
        resolver: Arc<dyn AssociatedAccountResolver>,
        encoder: Arc<dyn InstructionEncoder>,
    ) -> Self {
        Self { program_id, fetcher, resolver, encoder }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub async fn get_global_account(&self) -> ClientResult<GlobalAccount> {
        let address = get_global_pda(&self.program_id);
        match self.fetcher.fetch(&address).await? {
            Some(data) => GlobalAccount::from_bytes(&data),
            None => Err(ClientError::AccountNotFound { account: "global", address }),
        }
    }

    /// Returns `None` when no bonding curve exists for `mint`.
    pub async fn get_bonding_curve_account(
        &self,
        mint: &Pubkey,
    ) -> ClientResult<Option<BondingCurveAccount>> {
        let address = get_bonding_curve_pda(&self.program_id, mint);
        self.fetcher
            .fetch(&address)
            .await?
            .map(|data| BondingCurveAccount::from_bytes(&data))
            .transpose()
    }

    async fn require_bonding_curve(&self, mint: &Pubkey) -> ClientResult<BondingCurveAccount> {
        self.get_bonding_curve_account(mint)
            .await?
            .ok_or(ClientError::AccountNotFound { account: "bonding curve", address: *mint })
    }

    /// Quotes a buy spending `sol_amount` lamports, fees included.
    ///
    /// Tokens are priced on the amount left after system and creator fees, while the slippage
    /// bound is taken on the full amount.
    ///
    /// A zero `sol_amount` is rejected with [`ClientError::InvalidAmount`] before any account
    /// is fetched, so no zero-token buy is ever emitted.
    pub async fn buy_request_by_sol_amount(
        &self,
        mint: &Pubkey,
        sol_amount: u64,
        slippage_basis_points: u64,
        trade_authority: Option<Pubkey>,
    ) -> ClientResult<BuyRequest> {
        if sol_amount == 0 {
            return Err(ClientError::InvalidAmount("buy sol amount must be positive"));
        }

        let global = self.get_global_account().await?;
        let bonding_curve = self.require_bonding_curve(mint).await?;

        let fee = compute_fee(sol_amount as u128, global.total_fee_basis_points())?;
        let effective_sol_amount = (sol_amount as u128).saturating_sub(fee) as u64;
        let token_amount = bonding_curve.get_buy_price(effective_sol_amount)?;
        let max_sol_cost =
            slippage_bound_to_u64(calculate_with_slippage_buy(sol_amount, slippage_basis_points))?;

        log::debug!(
            "buy quote for {}: sol {}, effective sol {}, tokens {}, max sol cost {}",
            mint,
            sol_amount,
            effective_sol_amount,
            token_amount,
            max_sol_cost
        );

        Ok(BuyRequest {
            token_amount,
            max_sol_cost,
            fee_recipient: global.fee_recipient,
            creator_fee_recipient: bonding_curve.creator,
            trade_authority,
        })
    }

    /// Quotes a sell of `token_amount` tokens, net of system and creator fees.
    ///
    /// A zero `token_amount` is rejected with [`ClientError::InvalidAmount`].
    pub async fn sell_request_by_token_amount(
        &self,
        mint: &Pubkey,
        token_amount: u64,
        slippage_basis_points: u64,
    ) -> ClientResult<SellRequest> {
        if token_amount == 0 {
            return Err(ClientError::InvalidAmount("sell token amount must be positive"));
        }

        let bonding_curve = self.require_bonding_curve(mint).await?;
        let global = self.get_global_account().await?;

        let sol_output =
            bonding_curve.get_sell_price(token_amount, global.total_fee_basis_points())?;
        let min_sol_output = slippage_bound_to_u64(calculate_with_slippage_sell(
            sol_output,
            slippage_basis_points,
        ))?;

        log::debug!(
            "sell quote for {}: tokens {}, sol output {}, min sol output {}",
            mint,
            token_amount,
            sol_output,
            min_sol_output
        );

        Ok(SellRequest {
            token_amount,
            min_sol_output,
            fee_recipient: global.fee_recipient,
            creator_fee_recipient: bonding_curve.creator,
        })
    }

    /// Quotes the creator's first buy on a curve that does not exist yet.
    pub fn initial_buy_request(
        &self,
        global: &GlobalAccount,
        creator: &Pubkey,
        sol_amount: u64,
        slippage_basis_points: u64,
        trade_authority: Option<Pubkey>,
    ) -> ClientResult<BuyRequest> {
        let token_amount = global.get_initial_buy_price(sol_amount);
        let max_sol_cost =
            slippage_bound_to_u64(calculate_with_slippage_buy(sol_amount, slippage_basis_points))?;

        Ok(BuyRequest {
            token_amount,
            max_sol_cost,
            fee_recipient: global.fee_recipient,
            creator_fee_recipient: *creator,
            trade_authority,
        })
    }

    /// Buy instruction, preceded by the buyer's token account creation when it is missing.
    pub async fn get_buy_instructions(
        &self,
        buyer: &Pubkey,
        mint: &Pubkey,
        request: &BuyRequest,
    ) -> ClientResult<Vec<Instruction>> {
        let mut instructions = Vec::with_capacity(2);

        let associated_user = self.resolver.resolve(buyer, mint);
        if !self.resolver.exists(&associated_user).await? {
            instructions.push(create_associated_token_account(
                buyer,
                buyer,
                mint,
                &accounts::TOKEN_PROGRAM,
            ));
        }

        instructions.push(self.encoder.encode(&InstructionRequest::Buy {
            user: *buyer,
            mint: *mint,
            request: request.clone(),
        })?);

        Ok(instructions)
    }

    pub fn get_sell_instructions(
        &self,
        seller: &Pubkey,
        mint: &Pubkey,
        request: &SellRequest,
    ) -> ClientResult<Vec<Instruction>> {
        Ok(vec![self.encoder.encode(&InstructionRequest::Sell {
            user: *seller,
            mint: *mint,
            request: request.clone(),
        })?])
    }

    pub fn get_create_instructions(
        &self,
        mint: &Pubkey,
        request: &CreateRequest,
    ) -> ClientResult<Vec<Instruction>> {
        Ok(vec![self
            .encoder
            .encode(&InstructionRequest::Create { mint: *mint, request: request.clone() })?])
    }

    pub fn get_set_bonding_curve_cfg_instructions(
        &self,
        user: &Pubkey,
        mint: &Pubkey,
        trade_authority: Option<Pubkey>,
    ) -> ClientResult<Vec<Instruction>> {
        let request = SetBondingCurveCfgRequest { user: *user, mint: *mint, trade_authority };
        Ok(vec![self.encoder.encode(&InstructionRequest::SetBondingCurveCfg(request))?])
    }

    /// Launches a token. Signed by the creator and the new mint.
    pub async fn create_plan(
        &self,
        creator: &Pubkey,
        mint: &Pubkey,
        name: &str,
        symbol: &str,
        uri: &str,
        trade_authority: Option<Pubkey>,
    ) -> ClientResult<TradePlan> {
        let global = self.get_global_account().await?;
        let request = CreateRequest {
            name: name.to_string(),
            symbol: symbol.to_string(),
            uri: uri.to_string(),
            creator: *creator,
            fee_recipient: global.fee_recipient,
            trade_authority,
        };

        Ok(TradePlan {
            instructions: self.get_create_instructions(mint, &request)?,
            signers: vec![*creator, *mint],
        })
    }

    /// Launches a token and, when `buy_sol_amount > 0`, buys into it in the same transaction.
    ///
    /// Signed by the creator, the new mint and the trade authority when one is set.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_and_buy_plan(
        &self,
        creator: &Pubkey,
        mint: &Pubkey,
        metadata_uri: &str,
        name: &str,
        symbol: &str,
        buy_sol_amount: u64,
        slippage_basis_points: u64,
        trade_authority: Option<Pubkey>,
    ) -> ClientResult<TradePlan> {
        let mut plan =
            self.create_plan(creator, mint, name, symbol, metadata_uri, trade_authority).await?;

        if buy_sol_amount > 0 {
            let global = self.get_global_account().await?;
            let request = self.initial_buy_request(
                &global,
                creator,
                buy_sol_amount,
                slippage_basis_points,
                trade_authority,
            )?;
            plan.instructions.extend(self.get_buy_instructions(creator, mint, &request).await?);
        }

        if let Some(authority) = trade_authority {
            plan.signers.push(authority);
        }
        Ok(plan)
    }

    /// Buys with `sol_amount` lamports. Signed by the buyer and the trade authority when set.
    pub async fn buy_plan(
        &self,
        buyer: &Pubkey,
        mint: &Pubkey,
        sol_amount: u64,
        slippage_basis_points: u64,
        trade_authority: Option<Pubkey>,
    ) -> ClientResult<TradePlan> {
        let request = self
            .buy_request_by_sol_amount(mint, sol_amount, slippage_basis_points, trade_authority)
            .await?;
        let instructions = self.get_buy_instructions(buyer, mint, &request).await?;

        let mut signers = vec![*buyer];
        signers.extend(trade_authority);
        Ok(TradePlan { instructions, signers })
    }

    pub async fn sell_plan(
        &self,
        seller: &Pubkey,
        mint: &Pubkey,
        token_amount: u64,
        slippage_basis_points: u64,
    ) -> ClientResult<TradePlan> {
        let request = self
            .sell_request_by_token_amount(mint, token_amount, slippage_basis_points)
            .await?;

        Ok(TradePlan {
            instructions: self.get_sell_instructions(seller, mint, &request)?,
            signers: vec![*seller],
        })
    }

    pub fn set_bonding_curve_cfg_plan(
        &self,
        user: &Pubkey,
        mint: &Pubkey,
        trade_authority: Option<Pubkey>,
    ) -> ClientResult<TradePlan> {
        Ok(TradePlan {
            instructions: self.get_set_bonding_curve_cfg_instructions(user, mint, trade_authority)?,
            signers: vec![*user],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spl_associated_token_account::get_associated_token_address;

    use crate::accounts::test_utils::{
        encode_bonding_curve, encode_global, sample_bonding_curve, sample_global,
    };
    use crate::common::account_fetcher::test_utils::InMemoryAccounts;
    use crate::constants::happypump::discriminators;
    use crate::instruction::HappyPumpInstructionEncoder;

    struct Fixture {
        builder: TradeRequestBuilder,
        accounts: Arc<InMemoryAccounts>,
        global: GlobalAccount,
        curve: BondingCurveAccount,
        mint: Pubkey,
    }

    fn fixture() -> Fixture {
        let program_id = Pubkey::new_unique();
        let accounts = Arc::new(InMemoryAccounts::default());
        let global = sample_global();
        let curve = sample_bonding_curve();
        let mint = Pubkey::new_unique();

        accounts.insert(get_global_pda(&program_id), encode_global(&global));
        accounts.insert(get_bonding_curve_pda(&program_id, &mint), encode_bonding_curve(&curve));

        let builder = TradeRequestBuilder::new(
            program_id,
            accounts.clone(),
            accounts.clone(),
            Arc::new(HappyPumpInstructionEncoder::new(program_id)),
        );
        Fixture { builder, accounts, global, curve, mint }
    }

    #[tokio::test]
    async fn test_buy_request_prices_after_fees() {
        let f = fixture();
        let request =
            f.builder.buy_request_by_sol_amount(&f.mint, 1_000_000_000, 500, None).await.unwrap();

        // 100 bps of fees leaves 990_000_000 lamports to price
        let expected = f.curve.get_buy_price(990_000_000).unwrap();
        assert_eq!(request.token_amount, expected);
        assert_eq!(request.max_sol_cost, 1_050_000_000);
        assert_eq!(request.fee_recipient, f.global.fee_recipient);
        assert_eq!(request.creator_fee_recipient, f.curve.creator);
        assert_eq!(request.trade_authority, None);
    }

    #[tokio::test]
    async fn test_sell_request_applies_fees_then_slippage() {
        let f = fixture();
        let request =
            f.builder.sell_request_by_token_amount(&f.mint, 34_612_903_225_806, 500).await.unwrap();

        let quote = f.curve.get_sell_price(34_612_903_225_806, 100).unwrap();
        assert_eq!(request.min_sol_output, quote - quote * 500 / 10_000);
        assert_eq!(request.creator_fee_recipient, f.curve.creator);
    }

    #[tokio::test]
    async fn test_missing_bonding_curve_names_mint() {
        let f = fixture();
        let unknown = Pubkey::new_unique();
        let err = f.builder.buy_request_by_sol_amount(&unknown, 1, 500, None).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::AccountNotFound { account: "bonding curve", address } if address == unknown
        ));
        assert!(f.builder.get_bonding_curve_account(&unknown).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_global_account() {
        let program_id = Pubkey::new_unique();
        let accounts = Arc::new(InMemoryAccounts::default());
        let builder = TradeRequestBuilder::new(
            program_id,
            accounts.clone(),
            accounts,
            Arc::new(HappyPumpInstructionEncoder::new(program_id)),
        );
        assert!(matches!(
            builder.get_global_account().await,
            Err(ClientError::AccountNotFound { account: "global", .. })
        ));
    }

    #[tokio::test]
    async fn test_complete_curve_propagates() {
        let f = fixture();
        let complete = BondingCurveAccount { complete: true, ..f.curve.clone() };
        f.accounts.insert(
            get_bonding_curve_pda(f.builder.program_id(), &f.mint),
            encode_bonding_curve(&complete),
        );

        assert!(matches!(
            f.builder.buy_request_by_sol_amount(&f.mint, 1_000, 500, None).await,
            Err(ClientError::CurveComplete)
        ));
        assert!(matches!(
            f.builder.sell_request_by_token_amount(&f.mint, 1_000, 500).await,
            Err(ClientError::CurveComplete)
        ));
    }

    #[tokio::test]
    async fn test_zero_amounts_are_rejected() {
        let f = fixture();
        assert!(matches!(
            f.builder.buy_request_by_sol_amount(&f.mint, 0, 500, None).await,
            Err(ClientError::InvalidAmount(_))
        ));
        assert!(matches!(
            f.builder.sell_request_by_token_amount(&f.mint, 0, 500).await,
            Err(ClientError::InvalidAmount(_))
        ));
    }

    #[tokio::test]
    async fn test_oversized_sell_slippage_is_rejected() {
        let f = fixture();
        assert!(matches!(
            f.builder.sell_request_by_token_amount(&f.mint, 1_000_000_000, 20_000).await,
            Err(ClientError::SlippageBoundOutOfRange(_))
        ));
    }

    #[tokio::test]
    async fn test_buy_plan_creates_missing_token_account() {
        let f = fixture();
        let buyer = Pubkey::new_unique();

        let plan = f.builder.buy_plan(&buyer, &f.mint, 1_000_000_000, 500, None).await.unwrap();
        assert_eq!(plan.instructions.len(), 2);
        assert_eq!(plan.instructions[0].program_id, accounts::ASSOCIATED_TOKEN_PROGRAM);
        assert_eq!(&plan.instructions[1].data[..8], &discriminators::BUY_IX);
        assert_eq!(plan.signers, vec![buyer]);

        f.accounts.insert(get_associated_token_address(&buyer, &f.mint), vec![0; 165]);
        let plan = f.builder.buy_plan(&buyer, &f.mint, 1_000_000_000, 500, None).await.unwrap();
        assert_eq!(plan.instructions.len(), 1);
    }

    #[tokio::test]
    async fn test_buy_plan_with_trade_authority() {
        let f = fixture();
        let buyer = Pubkey::new_unique();
        let authority = Pubkey::new_unique();

        let plan =
            f.builder.buy_plan(&buyer, &f.mint, 1_000_000_000, 500, Some(authority)).await.unwrap();
        assert_eq!(plan.signers, vec![buyer, authority]);
        assert_eq!(plan.payer(), Some(&buyer));
    }

    #[tokio::test]
    async fn test_sell_plan() {
        let f = fixture();
        let seller = Pubkey::new_unique();
        let plan = f.builder.sell_plan(&seller, &f.mint, 1_000_000, 100).await.unwrap();
        assert_eq!(plan.instructions.len(), 1);
        assert_eq!(&plan.instructions[0].data[..8], &discriminators::SELL_IX);
        assert_eq!(plan.signers, vec![seller]);
    }

    #[tokio::test]
    async fn test_create_and_buy_without_buy_leg() {
        let f = fixture();
        let creator = Pubkey::new_unique();
        let mint = Pubkey::new_unique();

        let plan = f
            .builder
            .create_and_buy_plan(&creator, &mint, "ipfs://x", "Happy", "HAPPY", 0, 500, None)
            .await
            .unwrap();
        assert_eq!(plan.instructions.len(), 1);
        assert_eq!(&plan.instructions[0].data[..8], &discriminators::CREATE_IX);
        assert_eq!(plan.signers, vec![creator, mint]);
    }

    #[tokio::test]
    async fn test_create_and_buy_with_buy_leg() {
        let f = fixture();
        let creator = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let authority = Pubkey::new_unique();

        let plan = f
            .builder
            .create_and_buy_plan(
                &creator,
                &mint,
                "ipfs://x",
                "Happy",
                "HAPPY",
                1_000_000_000,
                500,
                Some(authority),
            )
            .await
            .unwrap();

        // create, token account, buy
        assert_eq!(plan.instructions.len(), 3);
        let buy = &plan.instructions[2];
        assert_eq!(&buy.data[..8], &discriminators::BUY_IX);
        assert_eq!(&buy.data[8..16], &34_612_903_225_806u64.to_le_bytes());
        assert_eq!(&buy.data[16..24], &1_050_000_000u64.to_le_bytes());
        // creator fees go to the creator on a fresh curve
        assert_eq!(buy.accounts[2].pubkey, creator);
        assert_eq!(plan.signers, vec![creator, mint, authority]);
    }

    #[tokio::test]
    async fn test_set_bonding_curve_cfg_plan() {
        let f = fixture();
        let user = Pubkey::new_unique();
        let plan = f.builder.set_bonding_curve_cfg_plan(&user, &f.mint, None).unwrap();
        assert_eq!(plan.signers, vec![user]);
        assert_eq!(plan.instructions[0].data, {
            let mut data = discriminators::SET_BONDING_CURVE_CFG_IX.to_vec();
            data.push(0);
            data
        });
    }
}
