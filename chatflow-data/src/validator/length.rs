use std::borrow::Cow;
use super::Validator;
use crate::{InvalidValue, Rejection};

// lengths are counted in characters of the trimmed input, not bytes
fn char_len(input: &str) -> usize {
  input.trim().chars().count()
}

#[derive(Debug, Clone)]
pub struct NotEmpty {
  message: Cow<'static, str>,
}

impl NotEmpty {
  pub fn new<STR>(message: STR) -> Self
      where STR: Into<Cow<'static, str>>
  {
    NotEmpty { message: message.into() }
  }
}

impl Validator for NotEmpty {
  fn validate(&self, input: &str) -> Result<(), Rejection> {
    if input.trim().is_empty() {
      return Err(Rejection::new(InvalidValue::Empty, self.message.clone()));
    }
    Ok(())
  }
}


#[derive(Debug, Clone)]
pub struct MinLength {
  min: usize,
  message: Cow<'static, str>,
}

impl MinLength {
  pub fn new<STR>(min: usize, message: STR) -> Self
      where STR: Into<Cow<'static, str>>
  {
    MinLength { min, message: message.into() }
  }
}

impl Validator for MinLength {
  fn validate(&self, input: &str) -> Result<(), Rejection> {
    let len = char_len(input);
    if len == 0 {
      return Err(Rejection::new(InvalidValue::Empty, self.message.clone()));
    }
    if len < self.min {
      return Err(Rejection::new(InvalidValue::OutOfRange, self.message.clone()));
    }
    Ok(())
  }
}


#[derive(Debug, Clone)]
pub struct MaxLength {
  max: usize,
  message: Cow<'static, str>,
}

impl MaxLength {
  pub fn new<STR>(max: usize, message: STR) -> Self
      where STR: Into<Cow<'static, str>>
  {
    MaxLength { max, message: message.into() }
  }
}

impl Validator for MaxLength {
  fn validate(&self, input: &str) -> Result<(), Rejection> {
    if char_len(input) > self.max {
      return Err(Rejection::new(InvalidValue::OutOfRange, self.message.clone()));
    }
    Ok(())
  }
}
