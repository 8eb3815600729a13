use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Errors surfaced by the HappyPump client.
///
/// Pricing and decoding never return partial results: every failure maps to one of these
/// variants and is propagated unchanged through the trade request builder.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to decode {account} account: {reason}")]
    Decode { account: &'static str, reason: String },
    #[error("bonding curve is complete")]
    CurveComplete,
    #[error("{account} account not found: {address}")]
    AccountNotFound { account: &'static str, address: Pubkey },
    #[error("malformed {event}: missing or invalid field `{field}`")]
    MalformedEvent { event: &'static str, field: String },
    #[error("unknown event kind: {0}")]
    UnknownEventKind(String),
    #[error("buy-out of {requested} exceeds virtual token reserves {available}")]
    InsufficientVirtualReserves { requested: u128, available: u128 },
    #[error("arithmetic overflow computing {0}")]
    ArithmeticOverflow(&'static str),
    #[error("slippage bound {0} does not fit in a u64 amount")]
    SlippageBoundOutOfRange(i128),
    #[error("invalid amount: {0}")]
    InvalidAmount(&'static str),
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("metadata upload failed: {0}")]
    Metadata(String),
    #[error("instruction encoding failed: {0}")]
    Encode(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl From<solana_client::client_error::ClientError> for ClientError {
    fn from(e: solana_client::client_error::ClientError) -> Self {
        ClientError::Rpc(e.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Metadata(e.to_string())
    }
}
