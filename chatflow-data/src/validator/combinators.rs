use std::borrow::Cow;
use super::Validator;
use crate::{InvalidValue, Rejection};

/// Runs each validator in order; the first rejection wins
#[derive(Debug, Default)]
pub struct AllOf {
  validators: Vec<Box<dyn Validator>>,
}

impl AllOf {
  pub fn new() -> Self {
    AllOf { validators: Vec::new() }
  }

  pub fn with<V>(mut self, validator: V) -> Self
      where V: Validator + 'static
  {
    self.validators.push(Box::new(validator));
    self
  }
}

impl Validator for AllOf {
  fn validate(&self, input: &str) -> Result<(), Rejection> {
    self.validators
      .iter()
      .try_for_each(|validator| validator.validate(input))
  }
}


/// Validator that wraps a predicate.
///
/// ```
/// # use chatflow_data::{Validator, FnValidator};
/// let yes_no = FnValidator::new(|input| input == "yes" || input == "no", "Please answer yes or no");
/// assert!(yes_no.validate("yes").is_ok());
/// assert!(yes_no.validate("maybe").is_err());
/// ```
pub struct FnValidator<F> {
  predicate: F,
  message: Cow<'static, str>,
}

impl<F> std::fmt::Debug for FnValidator<F> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "FnValidator({})", self.message)
  }
}

impl<F> FnValidator<F>
    where F: Fn(&str) -> bool + Send + Sync
{
  pub fn new<STR>(predicate: F, message: STR) -> Self
      where STR: Into<Cow<'static, str>>
  {
    FnValidator { predicate, message: message.into() }
  }
}

impl<F> Validator for FnValidator<F>
    where F: Fn(&str) -> bool + Send + Sync
{
  fn validate(&self, input: &str) -> Result<(), Rejection> {
    if (self.predicate)(input.trim()) {
      Ok(())
    } else {
      Err(Rejection::new(InvalidValue::WrongValue, self.message.clone()))
    }
  }
}
