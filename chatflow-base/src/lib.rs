//! Base components for ChatFlow
//!
//! Identity of chat users ([`UserId`]) and the [`NamedStore`] that backs every startup-time registry.

mod errors;
pub use errors::RegistryError;

pub mod id;
pub use id::UserId;

mod named_store;
pub use named_store::NamedStore;
