//! Flow engine layer for ChatFlow
//!
//! - A [`Flow`] is an immutable, ordered list of [`Step`]s built with a [`FlowBuilder`] and registered
//!   once in a [`FlowRegistry`].
//! - Every user has exactly one [`Session`], owned by the [`SessionStore`], which tracks the active flow,
//!   the current step and the flow's [`ContextData`](chatflow_data::ContextData).
//! - Hooks and handlers act on a session through a [`FlowContext`], which holds that user's lock for
//!   the duration of one event.

mod errors;
pub use errors::FlowError;

mod config;
pub use config::{EngineConfig, StartPolicy};

mod step;
pub use step::{Step, StepOutcome, Input, Hook, InputHook};

mod flow;
pub use flow::{Flow, FlowBuilder};

mod registry;
pub use registry::FlowRegistry;

mod session;
pub use session::{Session, SessionStatus};

mod context;
pub use context::{FlowContext, StepTransition};

mod store;
pub use store::SessionStore;

#[cfg(test)]
mod test;
