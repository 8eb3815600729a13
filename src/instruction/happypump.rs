use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};
use spl_associated_token_account::get_associated_token_address;

use crate::constants::happypump::{accounts, discriminators};
use crate::error::{ClientError, ClientResult};
use crate::trading::core::params::{
    BuyRequest, CreateRequest, SellRequest, SetBondingCurveCfgRequest,
};
use crate::trading::happypump::common::{
    get_associated_bonding_curve, get_bonding_curve_pda, get_event_authority_pda,
    get_global_pda, get_metadata_pda, get_mint_authority_pda,
};

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CreateArgs {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub trade_authority: Option<Pubkey>,
    pub creator: Pubkey,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BuyArgs {
    pub token_amount: u64,
    pub max_sol_cost: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct SellArgs {
    pub token_amount: u64,
    pub min_sol_output: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct SetBondingCurveCfgArgs {
    pub trade_authority: Option<Pubkey>,
}

/// A program instruction with every account and amount resolved
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstructionRequest {
    Create { mint: Pubkey, request: CreateRequest },
    Buy { user: Pubkey, mint: Pubkey, request: BuyRequest },
    Sell { user: Pubkey, mint: Pubkey, request: SellRequest },
    SetBondingCurveCfg(SetBondingCurveCfgRequest),
}

/// Turns instruction requests into program instructions.
pub trait InstructionEncoder: Send + Sync {
    fn encode(&self, request: &InstructionRequest) -> ClientResult<Instruction>;
}

/// Encoder for the HappyPump program deployed at `program_id`
#[derive(Clone, Debug)]
pub struct HappyPumpInstructionEncoder {
    program_id: Pubkey,
}

impl HappyPumpInstructionEncoder {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    fn data<T: BorshSerialize>(discriminator: [u8; 8], args: &T) -> ClientResult<Vec<u8>> {
        let mut data = discriminator.to_vec();
        args.serialize(&mut data).map_err(|e| ClientError::Encode(e.to_string()))?;
        Ok(data)
    }

    fn create(&self, mint: &Pubkey, request: &CreateRequest) -> ClientResult<Instruction> {
        let args = CreateArgs {
            name: request.name.clone(),
            symbol: request.symbol.clone(),
            uri: request.uri.clone(),
            trade_authority: request.trade_authority,
            creator: request.creator,
        };
        let program_id = &self.program_id;

        Ok(Instruction::new_with_bytes(
            *program_id,
            &Self::data(discriminators::CREATE_IX, &args)?,
            vec![
                AccountMeta::new(*mint, true),
                AccountMeta::new_readonly(get_mint_authority_pda(program_id), false),
                AccountMeta::new(get_bonding_curve_pda(program_id, mint), false),
                AccountMeta::new(get_associated_bonding_curve(program_id, mint), false),
                AccountMeta::new(get_global_pda(program_id), false),
                AccountMeta::new_readonly(accounts::MPL_TOKEN_METADATA, false),
                AccountMeta::new(get_metadata_pda(mint), false),
                AccountMeta::new(request.creator, true),
                AccountMeta::new(request.fee_recipient, false),
                AccountMeta::new_readonly(accounts::SYSTEM_PROGRAM, false),
                AccountMeta::new_readonly(accounts::TOKEN_PROGRAM, false),
                AccountMeta::new_readonly(accounts::ASSOCIATED_TOKEN_PROGRAM, false),
                AccountMeta::new_readonly(accounts::RENT, false),
                AccountMeta::new_readonly(get_event_authority_pda(program_id), false),
                AccountMeta::new_readonly(*program_id, false),
            ],
        ))
    }

    fn buy(&self, user: &Pubkey, mint: &Pubkey, request: &BuyRequest) -> ClientResult<Instruction> {
        let args =
            BuyArgs { token_amount: request.token_amount, max_sol_cost: request.max_sol_cost };
        let program_id = &self.program_id;
        // an absent optional account is passed as the program id
        let trade_authority = match request.trade_authority {
            Some(authority) => AccountMeta::new_readonly(authority, true),
            None => AccountMeta::new_readonly(*program_id, false),
        };

        Ok(Instruction::new_with_bytes(
            *program_id,
            &Self::data(discriminators::BUY_IX, &args)?,
            vec![
                AccountMeta::new_readonly(get_global_pda(program_id), false),
                AccountMeta::new(request.fee_recipient, false),
                AccountMeta::new(request.creator_fee_recipient, false),
                AccountMeta::new_readonly(*mint, false),
                AccountMeta::new(get_bonding_curve_pda(program_id, mint), false),
                AccountMeta::new(get_associated_bonding_curve(program_id, mint), false),
                AccountMeta::new(get_associated_token_address(user, mint), false),
                AccountMeta::new(*user, true),
                trade_authority,
                AccountMeta::new_readonly(accounts::SYSTEM_PROGRAM, false),
                AccountMeta::new_readonly(accounts::TOKEN_PROGRAM, false),
                AccountMeta::new_readonly(get_event_authority_pda(program_id), false),
                AccountMeta::new_readonly(*program_id, false),
            ],
        ))
    }

    fn sell(
        &self,
        user: &Pubkey,
        mint: &Pubkey,
        request: &SellRequest,
    ) -> ClientResult<Instruction> {
        let args =
            SellArgs { token_amount: request.token_amount, min_sol_output: request.min_sol_output };
        let program_id = &self.program_id;

        Ok(Instruction::new_with_bytes(
            *program_id,
            &Self::data(discriminators::SELL_IX, &args)?,
            vec![
                AccountMeta::new_readonly(get_global_pda(program_id), false),
                AccountMeta::new(request.fee_recipient, false),
                AccountMeta::new(request.creator_fee_recipient, false),
                AccountMeta::new_readonly(*mint, false),
                AccountMeta::new(get_bonding_curve_pda(program_id, mint), false),
                AccountMeta::new(get_associated_bonding_curve(program_id, mint), false),
                AccountMeta::new(get_associated_token_address(user, mint), false),
                AccountMeta::new(*user, true),
                AccountMeta::new_readonly(accounts::SYSTEM_PROGRAM, false),
                AccountMeta::new_readonly(accounts::TOKEN_PROGRAM, false),
                AccountMeta::new_readonly(get_event_authority_pda(program_id), false),
                AccountMeta::new_readonly(*program_id, false),
            ],
        ))
    }

    fn set_bonding_curve_cfg(
        &self,
        request: &SetBondingCurveCfgRequest,
    ) -> ClientResult<Instruction> {
        let args = SetBondingCurveCfgArgs { trade_authority: request.trade_authority };
        let program_id = &self.program_id;

        Ok(Instruction::new_with_bytes(
            *program_id,
            &Self::data(discriminators::SET_BONDING_CURVE_CFG_IX, &args)?,
            vec![
                AccountMeta::new(request.user, true),
                AccountMeta::new_readonly(request.mint, false),
                AccountMeta::new(get_bonding_curve_pda(program_id, &request.mint), false),
                AccountMeta::new_readonly(get_global_pda(program_id), false),
                AccountMeta::new_readonly(get_event_authority_pda(program_id), false),
                AccountMeta::new_readonly(*program_id, false),
            ],
        ))
    }
}

impl InstructionEncoder for HappyPumpInstructionEncoder {
    fn encode(&self, request: &InstructionRequest) -> ClientResult<Instruction> {
        match request {
            InstructionRequest::Create { mint, request } => self.create(mint, request),
            InstructionRequest::Buy { user, mint, request } => self.buy(user, mint, request),
            InstructionRequest::Sell { user, mint, request } => self.sell(user, mint, request),
            InstructionRequest::SetBondingCurveCfg(request) => self.set_bonding_curve_cfg(request),
        }
    }
}
