use std::borrow::Cow;
use once_cell::sync::Lazy;
use regex::Regex;
use super::Validator;
use crate::{InvalidValue, Rejection};

static REGEX_DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+(?:\.(?P<frac>\d+))?$").unwrap());

type Rule<T> = Option<(T, Cow<'static, str>)>;

/// Accepts plain decimal numbers, optionally limited in precision and range.
///
/// Rules are checked in order: format, decimal places, lower bound, upper bound.
/// The first failing rule's message is the rejection.
///
/// ```
/// # use chatflow_data::{Validator, DecimalValidator};
/// let amount = DecimalValidator::new("Please enter a valid amount")
///   .max_decimal_places(2, "Amount must have at most 2 decimal places")
///   .greater_than(0.0, "Amount must be greater than 0")
///   .at_most(10_000.0, "Maximum transfer amount is $10,000");
///
/// assert!(amount.validate("250.00").is_ok());
/// assert_eq!(amount.validate("-5").unwrap_err().message(), "Amount must be greater than 0");
/// ```
#[derive(Debug, Clone)]
pub struct DecimalValidator {
  format_message: Cow<'static, str>,
  max_decimal_places: Rule<usize>,
  greater_than: Rule<f64>,
  at_most: Rule<f64>,
}

impl DecimalValidator {
  /// `format_message` is used when the input is not a number at all
  pub fn new<STR>(format_message: STR) -> Self
      where STR: Into<Cow<'static, str>>
  {
    DecimalValidator {
      format_message: format_message.into(),
      max_decimal_places: None,
      greater_than: None,
      at_most: None,
    }
  }

  pub fn max_decimal_places<STR>(mut self, places: usize, message: STR) -> Self
      where STR: Into<Cow<'static, str>>
  {
    self.max_decimal_places = Some((places, message.into()));
    self
  }

  /// Exclusive lower bound
  pub fn greater_than<STR>(mut self, bound: f64, message: STR) -> Self
      where STR: Into<Cow<'static, str>>
  {
    self.greater_than = Some((bound, message.into()));
    self
  }

  /// Inclusive upper bound
  pub fn at_most<STR>(mut self, bound: f64, message: STR) -> Self
      where STR: Into<Cow<'static, str>>
  {
    self.at_most = Some((bound, message.into()));
    self
  }
}

impl Validator for DecimalValidator {
  fn validate(&self, input: &str) -> Result<(), Rejection> {
    let input = input.trim();
    if input.is_empty() {
      return Err(Rejection::new(InvalidValue::Empty, self.format_message.clone()));
    }

    let captures = REGEX_DECIMAL
      .captures(input)
      .ok_or_else(|| Rejection::new(InvalidValue::BadFormat, self.format_message.clone()))?;

    if let Some((places, message)) = &self.max_decimal_places {
      let frac_len = captures.name("frac").map(|frac| frac.as_str().len()).unwrap_or(0);
      if frac_len > *places {
        return Err(Rejection::new(InvalidValue::BadFormat, message.clone()));
      }
    }

    let value = input
      .parse::<f64>()
      .map_err(|_e| Rejection::new(InvalidValue::BadFormat, self.format_message.clone()))?;

    if let Some((bound, message)) = &self.greater_than {
      if value <= *bound {
        return Err(Rejection::new(InvalidValue::OutOfRange, message.clone()));
      }
    }
    if let Some((bound, message)) = &self.at_most {
      if value > *bound {
        return Err(Rejection::new(InvalidValue::OutOfRange, message.clone()));
      }
    }
    Ok(())
  }
}
