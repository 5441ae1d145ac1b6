// Wei/ether conversion helpers

use ethabi::ethereum_types::U256;
use thiserror::Error;

/// Number of decimals between wei and ether
pub const ETHER_DECIMALS: usize = 18;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitsError {
    #[error("invalid ether amount: {0:?}")]
    InvalidAmount(String),
    #[error("ether amount {0:?} has more than 18 decimals")]
    TooManyDecimals(String),
    #[error("ether amount {0:?} does not fit in 256 bits")]
    Overflow(String),
}

fn wei_per_ether() -> U256 {
    U256::exp10(ETHER_DECIMALS)
}

/// Parse a decimal ether amount ("1.5", "2", "0.01") into wei.
pub fn to_wei(amount: &str) -> Result<U256, UnitsError> {
    let trimmed = amount.trim();
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(UnitsError::InvalidAmount(amount.to_string()));
    }
    if fraction.len() > ETHER_DECIMALS {
        return Err(UnitsError::TooManyDecimals(amount.to_string()));
    }

    let overflow = || UnitsError::Overflow(amount.to_string());

    let whole_wei = if whole.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(whole)
            .map_err(|_| overflow())?
            .checked_mul(wei_per_ether())
            .ok_or_else(overflow)?
    };

    let fraction_wei = if fraction.is_empty() {
        U256::zero()
    } else {
        let padded = format!("{:0<width$}", fraction, width = ETHER_DECIMALS);
        U256::from_dec_str(&padded).map_err(|_| overflow())?
    };

    whole_wei.checked_add(fraction_wei).ok_or_else(overflow)
}

/// Format a wei amount as ether. Always keeps one fractional digit, so one
/// ether renders as "1.0".
pub fn from_wei(wei: U256) -> String {
    let (whole, remainder) = wei.div_mod(wei_per_ether());
    let fraction = format!("{:0>width$}", remainder.to_string(), width = ETHER_DECIMALS);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, fraction)
    }
}
