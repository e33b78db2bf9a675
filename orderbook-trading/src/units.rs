//! Conversion from human-readable decimal amounts to integer base units
//!
//! All arithmetic is done on the decimal mantissa in 256-bit integer space, so
//! there is no binary floating point and no 96-bit overflow for large sizes
//! with 18-decimal tokens. Results are floored.

use alloy::primitives::U256;
use orderbook_core::{OrderError, OrderResult};
use rust_decimal::Decimal;

/// Maximum number of fractional digits accepted in a price
pub const MAX_PRICE_DECIMALS: u32 = 8;

/// `floor(amount * 10^decimals)`
pub fn to_base_units(amount: Decimal, decimals: u8) -> OrderResult<U256> {
    let mantissa = unsigned_mantissa(amount)?;
    scale_to_base_units(mantissa, amount.scale(), decimals)
}

/// `floor(size * price * 10^decimals)`, with the product kept exact
pub fn quote_to_base_units(size: Decimal, price: Decimal, decimals: u8) -> OrderResult<U256> {
    let product = unsigned_mantissa(size)?
        .checked_mul(unsigned_mantissa(price)?)
        .ok_or_else(|| {
            OrderError::invalid_amount(format!("{} * {} overflows uint256", size, price))
        })?;
    scale_to_base_units(product, size.scale() + price.scale(), decimals)
}

/// Reject prices with more than [`MAX_PRICE_DECIMALS`] fractional digits
///
/// Trailing zeros count: `0.865000000` has nine digits and is rejected.
pub fn check_decimal_places(price: Decimal) -> OrderResult<()> {
    if price.scale() > MAX_PRICE_DECIMALS {
        return Err(OrderError::ExcessDecimalPlaces {
            price: price.to_string(),
            max: MAX_PRICE_DECIMALS,
        });
    }
    Ok(())
}

fn unsigned_mantissa(amount: Decimal) -> OrderResult<U256> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(OrderError::invalid_amount(format!(
            "amount must not be negative: {}",
            amount
        )));
    }
    Ok(U256::from(amount.mantissa().unsigned_abs()))
}

fn scale_to_base_units(mantissa: U256, scale: u32, decimals: u8) -> OrderResult<U256> {
    let ten = U256::from(10u8);
    let multiplier = ten
        .checked_pow(U256::from(decimals))
        .ok_or_else(|| OrderError::invalid_amount(format!("10^{} overflows", decimals)))?;
    let divisor = ten
        .checked_pow(U256::from(scale))
        .ok_or_else(|| OrderError::invalid_amount(format!("scale {} overflows", scale)))?;

    let scaled = mantissa
        .checked_mul(multiplier)
        .ok_or_else(|| OrderError::invalid_amount("amount overflows uint256"))?;
    Ok(scaled / divisor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_base_units() {
        assert_eq!(to_base_units(dec!(40), 6).unwrap(), U256::from(40_000_000u64));
        assert_eq!(to_base_units(dec!(34.8), 6).unwrap(), U256::from(34_800_000u64));
        assert_eq!(to_base_units(dec!(0), 18).unwrap(), U256::ZERO);
        assert_eq!(to_base_units(dec!(1.5), 0).unwrap(), U256::from(1u8));
    }

    #[test]
    fn test_to_base_units_large_amount() {
        let expected = U256::from(123_734_734_873_497_834u128) * U256::from(1_000_000u64);
        assert_eq!(
            to_base_units(dec!(123734734873497834), 6).unwrap(),
            expected
        );

        // Does not fit in a 96-bit decimal once scaled
        let expected = U256::from(123_734_734_873_497_834u128)
            * U256::from(10u8).pow(U256::from(18u8));
        assert_eq!(
            to_base_units(dec!(123734734873497834), 18).unwrap(),
            expected
        );
    }

    #[test]
    fn test_to_base_units_floors() {
        assert_eq!(to_base_units(dec!(1.9999999), 6).unwrap(), U256::from(1_999_999u64));
        assert_eq!(
            quote_to_base_units(dec!(50), dec!(0.86440911), 6).unwrap(),
            U256::from(43_220_455u64)
        );
    }

    #[test]
    fn test_quote_to_base_units() {
        assert_eq!(
            quote_to_base_units(dec!(40), dec!(0.87), 6).unwrap(),
            U256::from(34_800_000u64)
        );
        assert_eq!(
            quote_to_base_units(dec!(543), dec!(0.09), 6).unwrap(),
            U256::from(48_870_000u64)
        );
        assert_eq!(
            quote_to_base_units(dec!(40), dec!(0.86500000), 6).unwrap(),
            U256::from(34_600_000u64)
        );
    }

    #[test]
    fn test_negative_amount_rejected() {
        assert!(matches!(
            to_base_units(dec!(-1), 6),
            Err(OrderError::InvalidAmount(_))
        ));
        assert!(matches!(
            quote_to_base_units(dec!(10), dec!(-0.5), 6),
            Err(OrderError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_check_decimal_places() {
        for ok in [dec!(0.86), dec!(1.2345678), dec!(100), dec!(0), dec!(0.86500000)] {
            assert!(check_decimal_places(ok).is_ok(), "{}", ok);
        }

        for bad in [dec!(0.123456789), dec!(1.000000001)] {
            assert!(
                matches!(
                    check_decimal_places(bad),
                    Err(OrderError::ExcessDecimalPlaces { max: 8, .. })
                ),
                "{}",
                bad
            );
        }
    }
}
