//! Event routing for ChatFlow
//!
//! The [`Dispatcher`] is the single entry point a transport calls for every inbound [`Event`].
//! A user in a flow has the event fed to their current step; otherwise it is matched against the
//! command, text and callback [`Route`]s registered with a [`DispatcherBuilder`].

mod error;
pub use error::DispatchError;

mod event;
pub use event::{Event, Command};

mod route;
pub use route::{Route, RouteKind, Gate, Handler};

mod dispatcher;
pub use dispatcher::{Dispatcher, DispatcherBuilder, EventOutcome};

#[cfg(test)]
mod test;
