//! Fixed-point amounts
//!
//! All value arithmetic happens on integer minor units. A chain with
//! `decimals = 8` stores one coin as `100_000_000` units.

use thiserror::Error;

/// Value in minor units
pub type Amount = u64;

/// Largest supported number of decimal places
pub const MAX_DECIMALS: u32 = 18;

/// Amount parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Empty amount")]
    Empty,
    #[error("Invalid amount: {0}")]
    Invalid(String),
    #[error("Too many decimal places: at most {0} allowed")]
    TooPrecise(u32),
    #[error("Amount out of range")]
    Overflow,
}

/// Number of minor units in one whole coin, saturating for absurd precision.
pub fn unit_scale(decimals: u32) -> Amount {
    10u64.saturating_pow(decimals)
}

/// Convert whole coins into minor units
pub fn coins_to_units(coins: u64, decimals: u32) -> Result<Amount, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::TooPrecise(MAX_DECIMALS));
    }
    coins
        .checked_mul(unit_scale(decimals))
        .ok_or(AmountError::Overflow)
}

/// Parse a decimal string ("12", "0.5", "3.25000000") into minor units.
pub fn parse_amount(text: &str, decimals: u32) -> Result<Amount, AmountError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction)
    {
        return Err(AmountError::Invalid(text.to_string()));
    }
    if fraction.len() > decimals as usize {
        return Err(AmountError::TooPrecise(decimals));
    }

    let whole_units = if whole.is_empty() {
        0
    } else {
        let coins: u64 = whole.parse().map_err(|_| AmountError::Overflow)?;
        coins_to_units(coins, decimals)?
    };

    let fraction_units = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = decimals as usize);
        padded
            .parse::<u64>()
            .map_err(|_| AmountError::Invalid(text.to_string()))?
    };

    whole_units
        .checked_add(fraction_units)
        .ok_or(AmountError::Overflow)
}

/// Render minor units as a decimal string with exactly `decimals` places.
pub fn format_amount(units: Amount, decimals: u32) -> String {
    if decimals == 0 {
        return units.to_string();
    }
    let scale = unit_scale(decimals);
    format!(
        "{}.{:0width$}",
        units / scale,
        units % scale,
        width = decimals as usize
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_and_fractional() {
        assert_eq!(parse_amount("12", 8).unwrap(), 1_200_000_000);
        assert_eq!(parse_amount("0.5", 8).unwrap(), 50_000_000);
        assert_eq!(parse_amount(".5", 8).unwrap(), 50_000_000);
        assert_eq!(parse_amount("3.", 8).unwrap(), 300_000_000);
        assert_eq!(parse_amount("0.00000001", 8).unwrap(), 1);
        assert_eq!(parse_amount(" 7 ", 0).unwrap(), 7);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(parse_amount("", 8), Err(AmountError::Empty));
        assert!(matches!(parse_amount("abc", 8), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_amount("-1", 8), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_amount("1.2.3", 8), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_amount(".", 8), Err(AmountError::Invalid(_))));
        assert_eq!(parse_amount("0.000000001", 8), Err(AmountError::TooPrecise(8)));
        assert_eq!(parse_amount("1.5", 0), Err(AmountError::TooPrecise(0)));
        assert_eq!(
            parse_amount("99999999999999999999", 8),
            Err(AmountError::Overflow)
        );
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(5_000_000_000, 8), "50.00000000");
        assert_eq!(format_amount(1, 8), "0.00000001");
        assert_eq!(format_amount(42, 0), "42");
        assert_eq!(format_amount(1_250, 3), "1.250");
    }

    #[test]
    fn test_coins_to_units() {
        assert_eq!(coins_to_units(50, 8).unwrap(), 5_000_000_000);
        assert_eq!(coins_to_units(u64::MAX, 1), Err(AmountError::Overflow));
        assert_eq!(coins_to_units(1, 19), Err(AmountError::TooPrecise(MAX_DECIMALS)));
    }
}
