use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};

use crate::constants::happypump::metadata::METADATA_API_URL;
use crate::constants::trade::{
    DEFAULT_COMPUTE_UNIT_LIMIT, DEFAULT_COMPUTE_UNIT_PRICE, DEFAULT_SLIPPAGE,
};

/// Compute budget attached in front of every instruction plan
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PriorityFee {
    pub unit_limit: u32,
    pub unit_price: u64,
}

impl Default for PriorityFee {
    fn default() -> Self {
        Self { unit_limit: DEFAULT_COMPUTE_UNIT_LIMIT, unit_price: DEFAULT_COMPUTE_UNIT_PRICE }
    }
}

/// Connection and trading configuration for [`crate::HappyPump`].
///
/// Deserializable from JSON; `program_id` is a base58 string and everything except the
/// endpoints and the program id has a default.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SdkConfig {
    pub rpc_url: String,
    pub ws_url: String,
    #[serde(default = "CommitmentConfig::confirmed")]
    pub commitment: CommitmentConfig,
    #[serde(deserialize_with = "deserialize_pubkey")]
    pub program_id: Pubkey,
    #[serde(default = "default_metadata_api_url")]
    pub metadata_api_url: String,
    #[serde(default = "default_slippage")]
    pub default_slippage_basis_points: u64,
    #[serde(default)]
    pub priority_fee: PriorityFee,
}

impl SdkConfig {
    pub fn new(rpc_url: String, ws_url: String, program_id: Pubkey) -> Self {
        Self {
            rpc_url,
            ws_url,
            commitment: CommitmentConfig::confirmed(),
            program_id,
            metadata_api_url: default_metadata_api_url(),
            default_slippage_basis_points: DEFAULT_SLIPPAGE,
            priority_fee: PriorityFee::default(),
        }
    }
}

fn default_metadata_api_url() -> String {
    METADATA_API_URL.to_string()
}

fn default_slippage() -> u64 {
    DEFAULT_SLIPPAGE
}

fn deserialize_pubkey<'de, D>(deserializer: D) -> Result<Pubkey, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Pubkey::from_str(&s).map_err(serde::de::Error::custom)
}

/// Token metadata submitted to the metadata upload service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTokenMetadata {
    pub name: String,
    pub symbol: String,
    pub description: String,
    /// Image bytes, uploaded as `image.png`
    pub file: Vec<u8>,
    pub twitter: Option<String>,
    pub telegram: Option<String>,
    pub website: Option<String>,
}

pub type SolanaRpcClient = solana_client::nonblocking::rpc_client::RpcClient;
