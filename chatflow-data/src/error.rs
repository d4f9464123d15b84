use std::borrow::Cow;

#[derive(Debug, PartialEq, Clone, Copy)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize))]
pub enum InvalidValue {
  Empty,
  BadFormat,
  WrongValue,
  OutOfRange,
}

impl std::error::Error for InvalidValue {}

impl std::fmt::Display for InvalidValue {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:?}", self)
  }
}


/// Why a [`Validator`](crate::Validator) refused an input, with the text shown to the user
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize))]
pub struct Rejection {
  pub reason: InvalidValue,
  pub message: Cow<'static, str>,
}

impl Rejection {
  pub fn new<STR>(reason: InvalidValue, message: STR) -> Self
      where STR: Into<Cow<'static, str>>
  {
    Rejection { reason, message: message.into() }
  }

  pub fn message(&self) -> &str {
    &self.message
  }
}

impl std::error::Error for Rejection {}

impl std::fmt::Display for Rejection {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} ({})", self.message, self.reason)
  }
}
