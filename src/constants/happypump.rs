//! Constants used by the HappyPump client.
//!
//! - `seeds`: seed values used for PDA derivation
//! - `accounts`: well-known program addresses the program interacts with
//! - `discriminators`: 8-byte tags prefixing instruction data, account data and event payloads
//! - `metadata`: metadata upload endpoint and fallback

/// Constants used as seeds for deriving PDAs (Program Derived Addresses)
pub mod seeds {
    /// Seed for the global state PDA
    pub const GLOBAL_SEED: &[u8] = b"global";

    /// Seed for the mint authority PDA
    pub const MINT_AUTHORITY_SEED: &[u8] = b"mint-authority";

    /// Seed for bonding curve PDAs
    pub const BONDING_CURVE_SEED: &[u8] = b"bonding-curve";

    /// Seed for metadata PDAs
    pub const METADATA_SEED: &[u8] = b"metadata";

    /// Seed for the event authority PDA used by self-CPI event emission
    pub const EVENT_AUTHORITY_SEED: &[u8] = b"__event_authority";
}

/// Constants related to program accounts and authorities
pub mod accounts {
    use solana_sdk::{pubkey, pubkey::Pubkey};

    /// Public key for the MPL Token Metadata program
    pub const MPL_TOKEN_METADATA: Pubkey = pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

    /// System Program ID
    pub const SYSTEM_PROGRAM: Pubkey = pubkey!("11111111111111111111111111111111");

    /// Token Program ID
    pub const TOKEN_PROGRAM: Pubkey = spl_token::ID;

    /// Associated Token Program ID
    pub const ASSOCIATED_TOKEN_PROGRAM: Pubkey =
        pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

    /// Rent Sysvar ID
    pub const RENT: Pubkey = pubkey!("SysvarRent111111111111111111111111111111111");
}

/// `sha256("<namespace>:<name>")[..8]` tags.
pub mod discriminators {
    // instructions
    pub const CREATE_IX: [u8; 8] = [24, 30, 200, 40, 5, 28, 7, 119];
    pub const BUY_IX: [u8; 8] = [102, 6, 61, 18, 1, 218, 235, 234];
    pub const SELL_IX: [u8; 8] = [51, 230, 133, 164, 1, 127, 131, 173];
    pub const SET_BONDING_CURVE_CFG_IX: [u8; 8] = [39, 67, 54, 69, 211, 32, 183, 157];

    // accounts
    pub const GLOBAL_ACCOUNT: [u8; 8] = [167, 232, 232, 177, 200, 108, 114, 127];
    pub const BONDING_CURVE_ACCOUNT: [u8; 8] = [23, 183, 248, 55, 96, 216, 172, 96];

    // events
    pub const CREATE_EVENT: [u8; 8] = [27, 114, 169, 77, 222, 235, 99, 118];
    pub const TRADE_EVENT: [u8; 8] = [189, 219, 127, 211, 78, 230, 97, 238];
    pub const COMPLETE_EVENT: [u8; 8] = [95, 114, 97, 156, 212, 46, 152, 8];
    pub const SET_GLOBAL_CFG_EVENT: [u8; 8] = [104, 98, 139, 215, 7, 31, 153, 58];
}

pub mod metadata {
    /// Upload endpoint for token metadata and images
    pub const METADATA_API_URL: &str = "https://happypump.io/api/ipfs";

    /// URI used when the metadata upload fails
    pub const PLACEHOLDER_METADATA_URI: &str = "http://www.foo.com";
}
