//! Data-related components for ChatFlow
//!
//! - [`ContextData`] is the per-session scratch space, addressed through typed [`ContextKey`]s.
//! - [`Validator`]s are pure checks over raw user input that either accept it or produce a [`Rejection`].

mod error;
pub use error::{InvalidValue, Rejection};

mod context;
pub use context::{ContextData, ContextKey, ContextValue};

pub mod validator;
pub use validator::{Validator, FnValidator, AllOf, NotEmpty, MinLength, MaxLength, Pattern, DecimalValidator};
