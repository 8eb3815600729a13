use crate::constants::trade::BASIS_POINTS_DENOMINATOR;
use crate::error::{ClientError, ClientResult};

/// Calculate transaction fee based on amount and fee basis points
///
/// The division truncates, matching the on-chain program.
///
/// # Parameters
/// * `amount` - Transaction amount
/// * `fee_basis_points` - Fee basis points, 1 basis point = 0.01%
///
/// # Examples
/// * fee_basis_points = 1   -> 0.01% fee
/// * fee_basis_points = 100 -> 1% fee
pub fn compute_fee(amount: u128, fee_basis_points: u128) -> ClientResult<u128> {
    amount
        .checked_mul(fee_basis_points)
        .map(|product| product / BASIS_POINTS_DENOMINATOR as u128)
        .ok_or(ClientError::ArithmeticOverflow("fee"))
}

/// Calculate buy amount with slippage protection
/// Add slippage percentage to the amount to bound the maximum SOL cost
///
/// # Parameters
/// * `amount` - Original transaction amount
/// * `basis_points` - Slippage basis points, 1 basis point = 0.01%
///
/// # Examples
/// * basis_points = 100 -> 1% slippage
/// * basis_points = 500 -> 5% slippage
pub fn calculate_with_slippage_buy(amount: u64, basis_points: u64) -> i128 {
    amount as i128 + slippage_delta(amount, basis_points)
}

/// Calculate sell amount with slippage protection
/// Subtract slippage percentage from the amount to bound the minimum SOL output
///
/// Slippage above 10000 basis points yields a negative bound, which is returned as is;
/// [`slippage_bound_to_u64`] rejects it before it reaches an instruction.
pub fn calculate_with_slippage_sell(amount: u64, basis_points: u64) -> i128 {
    amount as i128 - slippage_delta(amount, basis_points)
}

// u64 * u64 always fits in u128 and the quotient is below 2^115, so the cast is lossless
fn slippage_delta(amount: u64, basis_points: u64) -> i128 {
    ((amount as u128 * basis_points as u128) / BASIS_POINTS_DENOMINATOR as u128) as i128
}

/// Narrows a slippage bound to the `u64` carried by buy and sell instructions.
pub fn slippage_bound_to_u64(bound: i128) -> ClientResult<u64> {
    u64::try_from(bound).map_err(|_| ClientError::SlippageBoundOutOfRange(bound))
}
