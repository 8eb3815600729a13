//! Global account for the HappyPump program
//!
//! The global account stores the deployment-wide configuration: fee recipients, fee rates and
//! the reserves every new bonding curve is seeded with.
//!
//! # Fields
//!
//! - `discriminator`: Account type tag
//! - `initialized`: Whether the global account has been initialized
//! - `authority`: Authority pubkey that can modify settings
//! - `fee_recipient`: Account that receives system fees
//! - `initial_virtual_token_reserves`: Virtual token reserves of a freshly created curve
//! - `initial_virtual_sol_reserves`: Virtual SOL reserves of a freshly created curve
//! - `initial_real_token_reserves`: Real token reserves of a freshly created curve
//! - `initial_token_supply`: Total supply minted for each token
//! - `mint_fee`: Flat fee charged on creation, in lamports
//! - `system_fee_basis_points`: System fee rate out of 10000
//! - `creator_fee_basis_points`: Creator fee rate out of 10000

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use super::layout::{FieldKind, Layout, LayoutReader};
use crate::error::ClientResult;

/// Binary layout of the global account, in declaration order.
pub static GLOBAL_ACCOUNT_LAYOUT: &Layout = &[
    ("discriminator", FieldKind::U64),
    ("initialized", FieldKind::Bool),
    ("authority", FieldKind::Pubkey),
    ("fee_recipient", FieldKind::Pubkey),
    ("initial_virtual_token_reserves", FieldKind::U64),
    ("initial_virtual_sol_reserves", FieldKind::U64),
    ("initial_real_token_reserves", FieldKind::U64),
    ("initial_token_supply", FieldKind::U64),
    ("mint_fee", FieldKind::U64),
    ("system_fee_basis_points", FieldKind::U64),
    ("creator_fee_basis_points", FieldKind::U64),
];

/// Represents the global configuration account for token pricing and fees
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalAccount {
    /// Account type tag
    pub discriminator: u64,
    /// Whether the global account has been initialized
    pub initialized: bool,
    /// Authority that can modify global settings
    pub authority: Pubkey,
    /// Account that receives system fees
    pub fee_recipient: Pubkey,
    /// Initial virtual token reserves for price calculations
    pub initial_virtual_token_reserves: u64,
    /// Initial virtual SOL reserves for price calculations
    pub initial_virtual_sol_reserves: u64,
    /// Initial actual token reserves available for trading
    pub initial_real_token_reserves: u64,
    /// Total supply of each token
    pub initial_token_supply: u64,
    /// Flat creation fee in lamports
    pub mint_fee: u64,
    /// System fee in basis points
    pub system_fee_basis_points: u64,
    /// Creator fee in basis points
    pub creator_fee_basis_points: u64,
}

impl GlobalAccount {
    /// Decodes a global account from raw account data.
    pub fn from_bytes(data: &[u8]) -> ClientResult<Self> {
        let mut reader = LayoutReader::new("global", GLOBAL_ACCOUNT_LAYOUT, data)?;
        let account = Self {
            discriminator: reader.read_u64()?,
            initialized: reader.read_bool()?,
            authority: reader.read_pubkey()?,
            fee_recipient: reader.read_pubkey()?,
            initial_virtual_token_reserves: reader.read_u64()?,
            initial_virtual_sol_reserves: reader.read_u64()?,
            initial_real_token_reserves: reader.read_u64()?,
            initial_token_supply: reader.read_u64()?,
            mint_fee: reader.read_u64()?,
            system_fee_basis_points: reader.read_u64()?,
            creator_fee_basis_points: reader.read_u64()?,
        };
        reader.finish()?;
        Ok(account)
    }

    /// Combined system and creator fee, in basis points
    pub fn total_fee_basis_points(&self) -> u128 {
        self.system_fee_basis_points as u128 + self.creator_fee_basis_points as u128
    }

    /// Calculates the amount of tokens received by the first buy on a new curve
    ///
    /// # Arguments
    /// * `amount` - Amount of SOL to spend, in lamports
    ///
    /// # Returns
    /// Amount of tokens that would be received, capped at the initial real reserves
    pub fn get_initial_buy_price(&self, amount: u64) -> u64 {
        if amount == 0 {
            return 0;
        }

        let n: u128 = (self.initial_virtual_sol_reserves as u128)
            * (self.initial_virtual_token_reserves as u128);
        let i: u128 = (self.initial_virtual_sol_reserves as u128) + (amount as u128);
        let r: u128 = n / i + 1;
        let s: u128 = (self.initial_virtual_token_reserves as u128).saturating_sub(r);

        if s < (self.initial_real_token_reserves as u128) {
            s as u64
        } else {
            self.initial_real_token_reserves
        }
    }
}
