use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;

/// A positive amount of a chain's native coin, as typed by a person: `"0.01"`, `"1.5"`, `"3"`.
///
/// Only plain decimal notation is accepted. Signs, exponents, thousands separators and
/// currency symbols are rejected rather than cleaned up, since the value ends up in a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeAmount(Decimal);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Invalid number format: {0:?}")]
    InvalidFormat(String),
    #[error("Amount must be greater than zero")]
    NotPositive,
    #[error("Too big of a precision: {given} fractional digits, at most {allowed} supported")]
    WrongPrecision { given: u32, allowed: u32 },
    #[error("Amount does not fit into base units")]
    Overflow,
    #[error("Amount {0:?} has more digits than can be represented exactly")]
    Inexact(String),
}

static DECIMAL_NOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("valid regex"));

impl NativeAmount {
    pub fn parse(input: &str) -> Result<Self, AmountError> {
        let trimmed = input.trim();
        if !DECIMAL_NOTATION.is_match(trimmed) {
            return Err(AmountError::InvalidFormat(input.to_string()));
        }
        let parsed = Decimal::from_str(trimmed)
            .map_err(|_| AmountError::InvalidFormat(input.to_string()))?
            .normalize();
        // Decimal rounds past 28 significant digits instead of failing
        let fractional_digits = trimmed
            .split_once('.')
            .map_or(0, |(_, fraction)| fraction.trim_end_matches('0').len());
        if parsed.scale() as usize != fractional_digits {
            return Err(AmountError::Inexact(input.to_string()));
        }
        if parsed.is_zero() {
            return Err(AmountError::NotPositive);
        }
        Ok(NativeAmount(parsed))
    }

    /// Number of digits after the decimal point, trailing zeros excluded.
    pub fn scale(&self) -> u32 {
        self.0.scale()
    }

    /// Converts into the smallest unit of a coin with `decimals` fractional digits.
    ///
    /// No rounding happens: an amount with more fractional digits than the coin supports
    /// is rejected with [`AmountError::WrongPrecision`].
    pub fn to_base_units(&self, decimals: u32) -> Result<u128, AmountError> {
        let scale = self.scale();
        if scale > decimals {
            return Err(AmountError::WrongPrecision {
                given: scale,
                allowed: decimals,
            });
        }
        let mantissa = self.0.mantissa().unsigned_abs();
        10u128
            .checked_pow(decimals - scale)
            .and_then(|factor| mantissa.checked_mul(factor))
            .ok_or(AmountError::Overflow)
    }
}

impl FromStr for NativeAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NativeAmount::parse(s)
    }
}

impl TryFrom<&str> for NativeAmount {
    type Error = AmountError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        NativeAmount::from_str(value)
    }
}

impl Display for NativeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decimal string in ETH to wei (10^18).
pub fn ether_to_wei(amount: &NativeAmount) -> Result<u128, AmountError> {
    amount.to_base_units(18)
}

/// Decimal string in SOL to lamports (10^9).
pub fn sol_to_lamports(amount: &NativeAmount) -> Result<u64, AmountError> {
    let lamports = amount.to_base_units(9)?;
    u64::try_from(lamports).map_err(|_| AmountError::Overflow)
}
