use std::fmt;

/// Amounts are integer cents: 1 unit = 100 cents, so 50.00 = 5000.
/// Positive amounts are income, negative amounts are expenses.
pub type Cents = i64;

/// Largest accepted absolute amount: 1,000,000,000,000.00.
/// Keeps every sum over a realistic ledger well inside `i64`.
pub const MAX_AMOUNT: Cents = 100_000_000_000_000;

/// Format cents as a plain decimal string.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Parse a signed decimal string into cents.
/// Example: "50.00" -> 5000, "-12.5" -> -1250, "+100" -> 10000, ".5" -> 50
///
/// Digits past the second decimal place are truncated.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let (negative, digits) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        Some(_) => (false, input),
        None => return Err(ParseCentsError::Empty),
    };

    let (units_str, decimal_str) = match digits.split_once('.') {
        Some((units, decimals)) => (units, decimals),
        None => (digits, ""),
    };

    if units_str.is_empty() && decimal_str.is_empty() {
        return Err(ParseCentsError::InvalidFormat);
    }
    if !units_str.bytes().all(|b| b.is_ascii_digit())
        || !decimal_str.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(ParseCentsError::InvalidFormat);
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str.parse().map_err(|_| ParseCentsError::OutOfRange)?
    };

    let decimal_cents: i64 = match decimal_str.len() {
        0 => 0,
        // "5" after the point means 50 cents
        1 => i64::from(decimal_str.as_bytes()[0] - b'0') * 10,
        _ => decimal_str[..2]
            .parse()
            .map_err(|_| ParseCentsError::InvalidFormat)?,
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(decimal_cents))
        .filter(|c| *c <= MAX_AMOUNT)
        .ok_or(ParseCentsError::OutOfRange)?;
    Ok(if negative { -cents } else { cents })
}

/// Parse an amount cell read back from a ledger file.
///
/// Accepts everything [`parse_cents`] does, plus floating-point spellings
/// such as `1e3` or `2.5E-1`. Those are truncated to whole cents like the
/// plain decimal form.
pub fn parse_cents_lenient(input: &str) -> Result<Cents, ParseCentsError> {
    match parse_cents(input) {
        Err(ParseCentsError::InvalidFormat) => {}
        other => return other,
    }

    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| ParseCentsError::InvalidFormat)?;
    if !value.is_finite() {
        return Err(ParseCentsError::InvalidFormat);
    }

    let cents = value * 100.0;
    // 0.29 * 100 is 28.999999999999996
    let cents = if (cents - cents.round()).abs() < 1e-6 {
        cents.round()
    } else {
        cents.trunc()
    };
    if cents.abs() > MAX_AMOUNT as f64 {
        return Err(ParseCentsError::OutOfRange);
    }
    Ok(cents as Cents)
}

/// Sum amounts without overflowing; a sum past the `i64` range saturates.
pub fn sum_cents<I: IntoIterator<Item = Cents>>(amounts: I) -> Cents {
    amounts.into_iter().fold(0, Cents::saturating_add)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    Empty,
    InvalidFormat,
    OutOfRange,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::Empty => write!(f, "amount is empty"),
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::OutOfRange => write!(f, "amount is too large"),
        }
    }
}

impl std::error::Error for ParseCentsError {}
