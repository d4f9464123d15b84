//! [`Validator`]s check the raw text a user typed before a step acts on it.
//!
//! They are pure: no access to the session, no side effects. A rejection carries the message the
//! user sees, and the user stays where they are to try again.
//!
//! # Examples
//! ```
//! # use chatflow_data::{Validator, AllOf, MinLength, MaxLength};
//! let name = AllOf::new()
//!   .with(MinLength::new(2, "Name must be at least 2 characters long"))
//!   .with(MaxLength::new(32, "Name must be at most 32 characters long"));
//!
//! assert!(name.validate("Al").is_ok());
//! assert_eq!(name.validate("A").unwrap_err().message(), "Name must be at least 2 characters long");
//! ```

use std::fmt::Debug;
use super::Rejection;

pub trait Validator: Debug + Send + Sync {
  fn validate(&self, input: &str) -> Result<(), Rejection>;
}

mod length;
pub use length::{NotEmpty, MinLength, MaxLength};

mod pattern;
pub use pattern::Pattern;

mod decimal;
pub use decimal::DecimalValidator;

mod combinators;
pub use combinators::{AllOf, FnValidator};
