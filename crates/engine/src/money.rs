use std::{fmt, str::FromStr};

use crate::EngineError;

/// Signed money amount represented as **integer cents**.
///
/// Account balances arrive as decimal strings; every sum the engine computes
/// (net worth, category buckets) is done on this type to avoid floating-point
/// drift.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Parsing accepts `.` or `,` as decimal separator and rejects more than two
/// decimals; [`MoneyCents::parse_balance`] rounds them instead:
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
/// assert_eq!("-10,5".parse::<MoneyCents>().unwrap().cents(), -1050);
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// assert_eq!(MoneyCents::parse_balance("12.345").unwrap().cents(), 1234);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Adds `rhs`, failing with `InvalidAmount` on overflow.
    pub fn try_add(self, rhs: MoneyCents) -> Result<Self, EngineError> {
        self.checked_add(rhs)
            .ok_or_else(|| EngineError::InvalidAmount(format!("sum too large: {self} + {rhs}")))
    }

    /// Parses an account balance.
    ///
    /// Balances coming from the bank bridge may be missing; a blank string is
    /// treated as zero instead of an error. Digits past the cents are rounded
    /// half to even.
    pub fn parse_balance(raw: &str) -> Result<Self, EngineError> {
        if raw.trim().is_empty() {
            return Ok(Self::ZERO);
        }
        parse_cents(raw, true)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parses `[+-]units[.frac]` with `.` or `,` as separator and at most two
    /// fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_cents(s, false)
    }
}

/// Whether the digits dropped past the cents round the kept value up, half
/// to even on a tie.
fn rounds_up(dropped: &str, kept: i64) -> bool {
    let mut digits = dropped.bytes();
    match digits.next() {
        Some(b'5') if digits.all(|b| b == b'0') => kept % 2 == 1,
        Some(first) => first >= b'5',
        None => false,
    }
}

fn parse_cents(s: &str, round: bool) -> Result<MoneyCents, EngineError> {
    let invalid = || EngineError::InvalidAmount(format!("invalid amount: {s}"));
    let too_large = || EngineError::InvalidAmount(format!("amount too large: {s}"));

    let raw = s.trim();
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let digits = digits.replace(',', ".");
    let (units, frac) = digits.split_once('.').unwrap_or((digits.as_str(), ""));

    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if units.is_empty() || !all_digits(units) || !all_digits(frac) {
        return Err(invalid());
    }
    if frac.len() > 2 && !round {
        return Err(EngineError::InvalidAmount(format!("too many decimals: {s}")));
    }

    let (cents, dropped) = frac.split_at(frac.len().min(2));
    let frac_cents = match cents.len() {
        0 => 0,
        1 => cents.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => cents.parse::<i64>().map_err(|_| invalid())?,
    };

    let mut total = units
        .parse::<i64>()
        .ok()
        .and_then(|units| units.checked_mul(100))
        .and_then(|cents| cents.checked_add(frac_cents))
        .ok_or_else(too_large)?;
    if rounds_up(dropped, total) {
        total = total.checked_add(1).ok_or_else(too_large)?;
    }

    Ok(MoneyCents(if negative { -total } else { total }))
}
