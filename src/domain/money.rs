use thiserror::Error;

/// Amounts are kept as integer cents; 1 unit = 100 cents, so 15.50 = 1550.
pub type Cents = i64;

/// Largest amount a single entry may carry (100,000,000,000.00).
/// The `amount` column is REAL in units; below this bound every cent value
/// survives the trip through f64 and back.
pub const MAX_AMOUNT_CENTS: Cents = 10_000_000_000_000;

/// Format cents with exactly two decimals.
/// Example: 98450 -> "984.50", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Parse a decimal amount such as "15.5", "1000" or "0.01" into cents.
///
/// At most two decimal places are accepted; anything more precise is
/// rejected instead of being silently truncated.
pub fn parse_cents(input: &str) -> Result<Cents, ParseAmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseAmountError::Empty);
    }

    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let (units_str, decimals_str) = match digits.split_once('.') {
        Some((units, decimals)) => (units, decimals),
        None => (digits, ""),
    };

    if units_str.is_empty() && decimals_str.is_empty() {
        return Err(ParseAmountError::InvalidFormat(input.to_string()));
    }
    if !units_str.chars().all(|c| c.is_ascii_digit())
        || !decimals_str.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ParseAmountError::InvalidFormat(input.to_string()));
    }
    if decimals_str.len() > 2 {
        return Err(ParseAmountError::TooPrecise(input.to_string()));
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str
            .parse()
            .map_err(|_| ParseAmountError::InvalidFormat(input.to_string()))?
    };
    let decimals: i64 = match decimals_str.len() {
        0 => 0,
        1 => decimals_str.parse::<i64>().unwrap_or(0) * 10,
        _ => decimals_str.parse().unwrap_or(0),
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(decimals))
        .ok_or_else(|| ParseAmountError::InvalidFormat(input.to_string()))?;

    Ok(if negative { -cents } else { cents })
}

/// Convert a stored REAL amount back to cents.
pub fn cents_from_real(amount: f64) -> Cents {
    (amount * 100.0).round() as Cents
}

/// Convert cents to the REAL value persisted in the `amount` column.
pub fn cents_to_real(cents: Cents) -> f64 {
    cents as f64 / 100.0
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAmountError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid amount '{0}'")]
    InvalidFormat(String),

    #[error("amount '{0}' has more than two decimals")]
    TooPrecise(String),
}
