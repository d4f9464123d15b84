use std::borrow::Cow;
use once_cell::sync::Lazy;
use regex::Regex;
use super::Validator;
use crate::{InvalidValue, Rejection};

/// Accepts input matching a regular expression
#[derive(Debug, Clone)]
pub struct Pattern {
  regex: Regex,
  message: Cow<'static, str>,
}

impl Pattern {
  pub fn new<STR>(pattern: &str, message: STR) -> Result<Self, regex::Error>
      where STR: Into<Cow<'static, str>>
  {
    Ok(Pattern { regex: Regex::new(pattern)?, message: message.into() })
  }

  /// Accepts a plausible email address
  pub fn email<STR>(message: STR) -> Self
      where STR: Into<Cow<'static, str>>
  {
    // based on https://rust-lang-nursery.github.io/rust-cookbook/text/regex.html
    static REGEX_EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?x)^(?P<login>[^@\s]+)@([[:word:]]+\.)*[[:word:]]+$").unwrap());
    Pattern { regex: REGEX_EMAIL.clone(), message: message.into() }
  }
}

impl Validator for Pattern {
  fn validate(&self, input: &str) -> Result<(), Rejection> {
    let input = input.trim();
    if input.is_empty() {
      return Err(Rejection::new(InvalidValue::Empty, self.message.clone()));
    }
    if !self.regex.is_match(input) {
      return Err(Rejection::new(InvalidValue::BadFormat, self.message.clone()));
    }
    Ok(())
  }
}
