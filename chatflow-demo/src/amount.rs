use std::str::FromStr;
use chatflow::data::InvalidValue;

/// Money in whole cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct Amount(i64);

impl Amount {
  pub const ZERO: Amount = Amount(0);

  pub const fn from_cents(cents: i64) -> Self {
    Amount(cents)
  }

  pub fn cents(&self) -> i64 {
    self.0
  }

  pub fn is_positive(&self) -> bool {
    self.0 > 0
  }

  pub fn checked_add(self, other: Amount) -> Option<Amount> {
    self.0.checked_add(other.0).map(Amount)
  }

  pub fn checked_sub(self, other: Amount) -> Option<Amount> {
    self.0.checked_sub(other.0).map(Amount)
  }
}

/// Parses `12`, `-5`, `150.5` and `150.50`. More than two decimal places is an error, not rounded.
impl FromStr for Amount {
  type Err = InvalidValue;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim();
    let (negative, digits) = match s.as_bytes().first() {
      Some(b'-') => (true, &s[1..]),
      Some(b'+') => (false, &s[1..]),
      Some(_) => (false, s),
      None => return Err(InvalidValue::Empty),
    };
    let (whole, frac) = match digits.find('.') {
      Some(dot) => (&digits[..dot], &digits[dot + 1..]),
      None => (digits, ""),
    };
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || !all_digits(whole) || !all_digits(frac) || (digits.contains('.') && frac.is_empty()) {
      return Err(InvalidValue::BadFormat);
    }
    if frac.len() > 2 {
      return Err(InvalidValue::WrongValue);
    }

    let whole = whole.parse::<i64>().map_err(|_| InvalidValue::OutOfRange)?;
    let frac = match frac.len() {
      0 => 0,
      1 => frac.parse::<i64>().map_err(|_| InvalidValue::BadFormat)? * 10,
      _ => frac.parse::<i64>().map_err(|_| InvalidValue::BadFormat)?,
    };
    let cents = whole.checked_mul(100).and_then(|cents| cents.checked_add(frac)).ok_or(InvalidValue::OutOfRange)?;
    Ok(Amount(if negative { -cents } else { cents }))
  }
}

impl std::fmt::Display for Amount {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let sign = if self.0 < 0 { "-" } else { "" };
    let cents = self.0.unsigned_abs();
    write!(f, "{}{}.{:02}", sign, cents / 100, cents % 100)
  }
}
