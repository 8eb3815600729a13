//! Bonding curve account for the HappyPump program
//!
//! One bonding curve exists per launched token, at the PDA derived from the token mint. The
//! pricing methods reproduce the program's integer arithmetic exactly: every intermediate is
//! computed in `u128` and every division truncates.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use super::layout::{FieldKind, Layout, LayoutReader};
use crate::constants::trade::BASIS_POINTS_DENOMINATOR;
use crate::error::{ClientError, ClientResult};
use crate::utils::calc::common::compute_fee;

/// Binary layout of the bonding curve account, in declaration order.
pub static BONDING_CURVE_LAYOUT: &Layout = &[
    ("discriminator", FieldKind::U64),
    ("virtual_sol_reserves", FieldKind::U64),
    ("virtual_token_reserves", FieldKind::U64),
    ("real_sol_reserves", FieldKind::U64),
    ("real_token_reserves", FieldKind::U64),
    ("token_total_supply", FieldKind::U64),
    ("active", FieldKind::Bool),
    ("creator", FieldKind::Pubkey),
    ("trade_authority", FieldKind::OptionPubkey),
    ("complete", FieldKind::Bool),
];

/// Snapshot of a bonding curve account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondingCurveAccount {
    /// Account type tag
    pub discriminator: u64,
    /// Virtual SOL reserves used for price calculations
    pub virtual_sol_reserves: u64,
    /// Virtual token reserves used for price calculations
    pub virtual_token_reserves: u64,
    /// Actual SOL held by the curve
    pub real_sol_reserves: u64,
    /// Actual tokens available for purchase
    pub real_token_reserves: u64,
    /// Total supply of the token
    pub token_total_supply: u64,
    pub active: bool,
    /// Creator of the token, receives creator fees
    pub creator: Pubkey,
    /// Delegate allowed to trade on behalf of the creator
    pub trade_authority: Option<Pubkey>,
    /// Whether the curve has graduated
    pub complete: bool,
}

impl BondingCurveAccount {
    /// Decodes a bonding curve from raw account data.
    pub fn from_bytes(data: &[u8]) -> ClientResult<Self> {
        let mut reader = LayoutReader::new("bonding curve", BONDING_CURVE_LAYOUT, data)?;
        let account = Self {
            discriminator: reader.read_u64()?,
            virtual_sol_reserves: reader.read_u64()?,
            virtual_token_reserves: reader.read_u64()?,
            real_sol_reserves: reader.read_u64()?,
            real_token_reserves: reader.read_u64()?,
            token_total_supply: reader.read_u64()?,
            active: reader.read_bool()?,
            creator: reader.read_pubkey()?,
            trade_authority: reader.read_option_pubkey()?,
            complete: reader.read_bool()?,
        };
        reader.finish()?;
        Ok(account)
    }

    fn ensure_active(&self) -> ClientResult<()> {
        if self.complete {
            return Err(ClientError::CurveComplete);
        }
        Ok(())
    }

    /// Calculates the amount of tokens received for a given SOL amount
    ///
    /// The new virtual token reserves are rounded up by one, in favour of the curve.
    ///
    /// # Arguments
    /// * `amount` - SOL to spend, in lamports
    ///
    /// # Returns
    /// Tokens received, capped at the real token reserves
    pub fn get_buy_price(&self, amount: u64) -> ClientResult<u64> {
        if amount == 0 {
            return Ok(0);
        }
        self.ensure_active()?;

        // product of virtual reserves
        let n: u128 = (self.virtual_sol_reserves as u128) * (self.virtual_token_reserves as u128);
        // virtual sol reserves after the purchase, never zero since amount > 0
        let i: u128 = (self.virtual_sol_reserves as u128) + (amount as u128);
        // virtual token reserves after the purchase
        let r: u128 = n / i + 1;
        // an empty curve yields nothing rather than underflowing
        let s: u128 = (self.virtual_token_reserves as u128).saturating_sub(r);

        Ok(s.min(self.real_token_reserves as u128) as u64)
    }

    /// Calculates the SOL received for selling a given token amount, net of fees
    ///
    /// # Arguments
    /// * `amount` - Tokens to sell
    /// * `fee_basis_points` - Fee deducted from the gross SOL output
    pub fn get_sell_price(&self, amount: u64, fee_basis_points: u128) -> ClientResult<u64> {
        if amount == 0 {
            return Ok(0);
        }
        self.ensure_active()?;

        // the fee swallows the whole output
        if fee_basis_points >= BASIS_POINTS_DENOMINATOR as u128 {
            return Ok(0);
        }

        let amount = amount as u128;
        // denominator is never zero since amount > 0
        let n: u128 = (amount * self.virtual_sol_reserves as u128)
            / (self.virtual_token_reserves as u128 + amount);
        let a: u128 = compute_fee(n, fee_basis_points)?;

        // n <= virtual_sol_reserves, so the result always fits
        Ok(n.saturating_sub(a) as u64)
    }

    /// Market cap in lamports at the current virtual price
    pub fn get_market_cap_sol(&self) -> ClientResult<u128> {
        self.ensure_active()?;
        if self.virtual_token_reserves == 0 {
            return Ok(0);
        }

        Ok((self.token_total_supply as u128 * self.virtual_sol_reserves as u128)
            / self.virtual_token_reserves as u128)
    }

    /// Projected market cap in lamports once the remaining real reserves are bought out
    pub fn get_final_market_cap_sol(&self, fee_basis_points: u128) -> ClientResult<u128> {
        self.ensure_active()?;

        let virtual_tokens = self.virtual_token_reserves as u128;
        let real_tokens = self.real_token_reserves as u128;
        if virtual_tokens <= real_tokens {
            return Ok(0);
        }
        let total_virtual_tokens = virtual_tokens - real_tokens;

        let total_sell_value = self.get_buy_out_price(self.real_token_reserves, fee_basis_points)?;
        let total_virtual_value = total_sell_value
            .checked_add(self.virtual_sol_reserves as u128)
            .ok_or(ClientError::ArithmeticOverflow("final market cap"))?;

        (self.token_total_supply as u128)
            .checked_mul(total_virtual_value)
            .map(|value| value / total_virtual_tokens)
            .ok_or(ClientError::ArithmeticOverflow("final market cap"))
    }

    /// Estimated SOL needed to buy out the curve, fee included
    ///
    /// `amount` is compared against the real SOL reserves and the larger of the two drives the
    /// estimate, mirroring the program.
    pub fn get_buy_out_price(&self, amount: u64, fee_basis_points: u128) -> ClientResult<u128> {
        self.ensure_active()?;

        let sol_tokens = amount.max(self.real_sol_reserves) as u128;
        let virtual_tokens = self.virtual_token_reserves as u128;
        if virtual_tokens <= sol_tokens {
            return Err(ClientError::InsufficientVirtualReserves {
                requested: sol_tokens,
                available: virtual_tokens,
            });
        }

        // u64 * u64 fits, and the quotient plus one stays below u128::MAX
        let total_sell_value =
            (sol_tokens * self.virtual_sol_reserves as u128) / (virtual_tokens - sol_tokens) + 1;
        let fee = compute_fee(total_sell_value, fee_basis_points)?;

        total_sell_value.checked_add(fee).ok_or(ClientError::ArithmeticOverflow("buy-out price"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::layout::{max_len, min_len};
    use crate::accounts::test_utils::{encode_bonding_curve, sample_bonding_curve};

    fn complete_curve() -> BondingCurveAccount {
        BondingCurveAccount { complete: true, ..sample_bonding_curve() }
    }

    #[test]
    fn test_bonding_curve_layout_size() {
        assert_eq!(min_len(BONDING_CURVE_LAYOUT), 83);
        assert_eq!(max_len(BONDING_CURVE_LAYOUT), 115);
    }

    #[test]
    fn test_decode_round_trip_without_trade_authority() {
        let curve = sample_bonding_curve();
        let data = encode_bonding_curve(&curve);
        assert_eq!(data.len(), 83);
        assert_eq!(BondingCurveAccount::from_bytes(&data).unwrap(), curve);
    }

    #[test]
    fn test_decode_round_trip_with_trade_authority() {
        let curve = BondingCurveAccount {
            trade_authority: Some(Pubkey::new_unique()),
            complete: true,
            ..sample_bonding_curve()
        };
        let data = encode_bonding_curve(&curve);
        assert_eq!(data.len(), 115);
        assert_eq!(BondingCurveAccount::from_bytes(&data).unwrap(), curve);
    }

    #[test]
    fn test_zero_trade_authority_is_not_absent() {
        let curve = BondingCurveAccount {
            trade_authority: Some(Pubkey::default()),
            ..sample_bonding_curve()
        };
        let decoded = BondingCurveAccount::from_bytes(&encode_bonding_curve(&curve)).unwrap();
        assert_eq!(decoded.trade_authority, Some(Pubkey::default()));
    }

    #[test]
    fn test_decode_rejects_bad_option_tag() {
        let mut data = encode_bonding_curve(&sample_bonding_curve());
        // discriminator + 5 u64 + active + creator
        data[8 + 40 + 1 + 32] = 2;
        assert!(matches!(
            BondingCurveAccount::from_bytes(&data),
            Err(ClientError::Decode { account: "bonding curve", .. })
        ));
    }

    #[test]
    fn test_decode_rejects_truncated_buffer() {
        let data = encode_bonding_curve(&sample_bonding_curve());
        for len in [0, 8, 48, 82] {
            assert!(BondingCurveAccount::from_bytes(&data[..len]).is_err());
        }
    }

    #[test]
    fn test_buy_price_matches_formula() {
        let curve = sample_bonding_curve();
        let k = 30_000_000_000u128 * 1_073_000_000_000_000u128;
        let expected = 1_073_000_000_000_000u128 - (k / 31_000_000_000u128 + 1);
        assert_eq!(expected, 34_612_903_225_806);
        assert_eq!(curve.get_buy_price(1_000_000_000).unwrap() as u128, expected);
    }

    #[test]
    fn test_buy_price_capped_by_real_reserves() {
        let curve = sample_bonding_curve();
        assert_eq!(curve.get_buy_price(u64::MAX).unwrap(), curve.real_token_reserves);

        let small = BondingCurveAccount { real_token_reserves: 1_000, ..sample_bonding_curve() };
        assert_eq!(small.get_buy_price(1_000_000_000).unwrap(), 1_000);
    }

    #[test]
    fn test_buy_price_is_monotonic() {
        let curve = sample_bonding_curve();
        let mut previous = 0;
        for exponent in 0..20 {
            let amount = 10u64.pow(exponent);
            let tokens = curve.get_buy_price(amount).unwrap();
            assert!(tokens >= previous, "{} < {} at {}", tokens, previous, amount);
            assert!(tokens <= curve.real_token_reserves);
            previous = tokens;
        }
    }

    #[test]
    fn test_buy_price_on_empty_curve_is_zero() {
        let curve = BondingCurveAccount {
            virtual_token_reserves: 0,
            virtual_sol_reserves: 0,
            ..sample_bonding_curve()
        };
        assert_eq!(curve.get_buy_price(1_000).unwrap(), 0);
    }

    #[test]
    fn test_sell_price() {
        let curve = sample_bonding_curve();
        let tokens = 34_612_903_225_806u64;
        let gross =
            (tokens as u128 * 30_000_000_000u128) / (1_073_000_000_000_000u128 + tokens as u128);
        let fee = gross * 100 / 10_000;
        assert_eq!(curve.get_sell_price(tokens, 100).unwrap() as u128, gross - fee);
        assert_eq!(curve.get_sell_price(tokens, 0).unwrap() as u128, gross);
    }

    #[test]
    fn test_zero_amounts_short_circuit_before_completeness() {
        let curve = sample_bonding_curve();
        assert_eq!(curve.get_buy_price(0).unwrap(), 0);
        assert_eq!(curve.get_sell_price(0, 100).unwrap(), 0);

        let complete = complete_curve();
        assert_eq!(complete.get_buy_price(0).unwrap(), 0);
        assert_eq!(complete.get_sell_price(0, 100).unwrap(), 0);
    }

    #[test]
    fn test_complete_curve_rejects_pricing() {
        let curve = complete_curve();
        assert!(matches!(curve.get_buy_price(1), Err(ClientError::CurveComplete)));
        assert!(matches!(curve.get_sell_price(1, 100), Err(ClientError::CurveComplete)));
        assert!(matches!(curve.get_market_cap_sol(), Err(ClientError::CurveComplete)));
        assert!(matches!(curve.get_buy_out_price(1, 100), Err(ClientError::CurveComplete)));
        assert!(matches!(curve.get_final_market_cap_sol(100), Err(ClientError::CurveComplete)));
    }

    #[test]
    fn test_market_cap() {
        let curve = sample_bonding_curve();
        let expected = (1_000_000_000_000_000u128 * 30_000_000_000u128) / 1_073_000_000_000_000u128;
        assert_eq!(curve.get_market_cap_sol().unwrap(), expected);

        let empty = BondingCurveAccount { virtual_token_reserves: 0, ..sample_bonding_curve() };
        assert_eq!(empty.get_market_cap_sol().unwrap(), 0);
    }

    #[test]
    fn test_buy_out_price() {
        let curve = BondingCurveAccount { real_sol_reserves: 5_000, ..sample_bonding_curve() };
        let sol_tokens = 793_100_000_000_000u128;
        let total = sol_tokens * 30_000_000_000u128 / (1_073_000_000_000_000u128 - sol_tokens) + 1;
        let fee = total * 100 / 10_000;
        assert_eq!(curve.get_buy_out_price(793_100_000_000_000, 100).unwrap(), total + fee);

        // the real SOL reserves win when they exceed the requested amount
        let by_reserves = curve.get_buy_out_price(1, 0).unwrap();
        assert_eq!(
            by_reserves,
            5_000u128 * 30_000_000_000u128 / (1_073_000_000_000_000u128 - 5_000) + 1
        );
    }

    #[test]
    fn test_buy_out_price_rejects_exhausted_virtual_reserves() {
        let curve = sample_bonding_curve();
        assert!(matches!(
            curve.get_buy_out_price(1_073_000_000_000_000, 0),
            Err(ClientError::InsufficientVirtualReserves { .. })
        ));
    }

    #[test]
    fn test_final_market_cap() {
        let curve = sample_bonding_curve();
        let total_sell_value = curve.get_buy_out_price(curve.real_token_reserves, 100).unwrap();
        let expected = 1_000_000_000_000_000u128 * (30_000_000_000u128 + total_sell_value)
            / (1_073_000_000_000_000u128 - 793_100_000_000_000u128);
        assert_eq!(curve.get_final_market_cap_sol(100).unwrap(), expected);
    }

    fn extreme_curve() -> BondingCurveAccount {
        BondingCurveAccount {
            virtual_sol_reserves: u64::MAX,
            virtual_token_reserves: u64::MAX,
            real_token_reserves: u64::MAX - 1,
            token_total_supply: u64::MAX,
            ..sample_bonding_curve()
        }
    }

    #[test]
    fn test_final_market_cap_reports_overflow() {
        assert!(matches!(
            extreme_curve().get_final_market_cap_sol(0),
            Err(ClientError::ArithmeticOverflow(_))
        ));
    }

    #[test]
    fn test_buy_out_price_reports_fee_overflow() {
        let curve = extreme_curve();
        assert!(curve.get_buy_out_price(u64::MAX - 1, 0).is_ok());
        assert!(matches!(
            curve.get_buy_out_price(u64::MAX - 1, 100),
            Err(ClientError::ArithmeticOverflow(_))
        ));
    }

    #[test]
    fn test_sell_price_with_extreme_fee_is_zero() {
        let curve = BondingCurveAccount {
            virtual_sol_reserves: u64::MAX,
            virtual_token_reserves: 1,
            ..sample_bonding_curve()
        };
        assert_eq!(curve.get_sell_price(u64::MAX, 2 * u64::MAX as u128).unwrap(), 0);
        assert_eq!(curve.get_sell_price(u64::MAX, 10_000).unwrap(), 0);
        assert_eq!(curve.get_sell_price(u64::MAX, 0).unwrap(), u64::MAX - 1);
    }

    #[test]
    fn test_final_market_cap_zero_denominator() {
        let curve = BondingCurveAccount {
            virtual_token_reserves: 793_100_000_000_000,
            ..sample_bonding_curve()
        };
        assert_eq!(curve.get_final_market_cap_sol(100).unwrap(), 0);
    }
}
