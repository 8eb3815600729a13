use solana_sdk::{
    compute_budget::ComputeBudgetInstruction, instruction::Instruction, pubkey::Pubkey,
};
use spl_associated_token_account::get_associated_token_address;

use crate::common::PriorityFee;
use crate::constants::happypump::{accounts, seeds};

#[inline]
pub fn create_priority_fee_instructions(priority_fee: &PriorityFee) -> Vec<Instruction> {
    let mut instructions = Vec::with_capacity(2);
    instructions.push(ComputeBudgetInstruction::set_compute_unit_limit(priority_fee.unit_limit));
    instructions.push(ComputeBudgetInstruction::set_compute_unit_price(priority_fee.unit_price));

    instructions
}

#[inline]
pub fn get_global_pda(program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[seeds::GLOBAL_SEED], program_id).0
}

#[inline]
pub fn get_mint_authority_pda(program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[seeds::MINT_AUTHORITY_SEED], program_id).0
}

#[inline]
pub fn get_event_authority_pda(program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[seeds::EVENT_AUTHORITY_SEED], program_id).0
}

#[inline]
pub fn get_bonding_curve_pda(program_id: &Pubkey, mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[seeds::BONDING_CURVE_SEED, mint.as_ref()], program_id).0
}

/// Token account owned by the bonding curve that holds the unsold supply
#[inline]
pub fn get_associated_bonding_curve(program_id: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address(&get_bonding_curve_pda(program_id, mint), mint)
}

#[inline]
pub fn get_metadata_pda(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[seeds::METADATA_SEED, accounts::MPL_TOKEN_METADATA.as_ref(), mint.as_ref()],
        &accounts::MPL_TOKEN_METADATA,
    )
    .0
}
