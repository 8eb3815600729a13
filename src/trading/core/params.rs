use solana_sdk::{instruction::Instruction, pubkey::Pubkey};

/// Fully bound buy: the token amount to receive and the most SOL the buyer will pay
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuyRequest {
    pub token_amount: u64,
    pub max_sol_cost: u64,
    pub fee_recipient: Pubkey,
    pub creator_fee_recipient: Pubkey,
    pub trade_authority: Option<Pubkey>,
}

/// Fully bound sell: the token amount to sell and the least SOL the seller will accept
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SellRequest {
    pub token_amount: u64,
    pub min_sol_output: u64,
    pub fee_recipient: Pubkey,
    pub creator_fee_recipient: Pubkey,
}

/// Token launch parameters
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateRequest {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub creator: Pubkey,
    pub fee_recipient: Pubkey,
    pub trade_authority: Option<Pubkey>,
}

/// Changes (or clears) the trade authority of a bonding curve
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetBondingCurveCfgRequest {
    pub user: Pubkey,
    pub mint: Pubkey,
    pub trade_authority: Option<Pubkey>,
}

/// Instructions to submit together with the accounts that must sign them.
///
/// The first signer is the fee payer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TradePlan {
    pub instructions: Vec<Instruction>,
    pub signers: Vec<Pubkey>,
}

impl TradePlan {
    pub fn payer(&self) -> Option<&Pubkey> {
        self.signers.first()
    }

    /// Prepends instructions, e.g. compute budget settings.
    pub fn prepend(&mut self, instructions: Vec<Instruction>) {
        self.instructions.splice(0..0, instructions);
    }
}
