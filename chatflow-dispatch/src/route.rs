use chatflow_session::FlowContext;

/// Handler for a routed event.
///
/// The `&str` is the part of the event after its trigger: command arguments, the whole text for
/// text triggers, and the callback data after the matched prefix.
pub type Handler<S> = Box<dyn Fn(&mut FlowContext<'_, S>, &str) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize))]
pub enum RouteKind {
  /// `/name`, matched exactly on the name
  Command,
  /// A message matched exactly, ignoring surrounding whitespace
  Text,
  /// Callback data matched by prefix, longest prefix first
  CallbackPrefix,
}

/// Capability check run before a route's handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
  Open,
  Capability(String),
  /// The route's argument is the capability, e.g. the flow name in `start_flow:<name>`
  Argument,
}

impl Gate {
  pub fn capability<'r>(&'r self, argument: &'r str) -> Option<&'r str> {
    match self {
      Gate::Open => None,
      Gate::Capability(capability) => Some(capability.as_str()),
      Gate::Argument => Some(argument),
    }
  }
}

pub struct Route<S> {
  kind: RouteKind,
  trigger: String,
  gate: Gate,
  handler: Handler<S>,
}

impl<S> std::fmt::Debug for Route<S> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Route")
      .field("kind", &self.kind)
      .field("trigger", &self.trigger)
      .field("gate", &self.gate)
      .finish()
  }
}

impl<S: 'static> Route<S> {
  pub fn new<STR, F>(kind: RouteKind, trigger: STR, gate: Gate, handler: F) -> Self
      where STR: Into<String>,
            F: Fn(&mut FlowContext<'_, S>, &str) + Send + Sync + 'static
  {
    let mut trigger = trigger.into();
    if kind == RouteKind::Command && trigger.starts_with('/') {
      trigger.remove(0);
    }
    Route {
      kind,
      trigger,
      gate,
      handler: Box::new(handler),
    }
  }
}

impl<S> Route<S> {
  pub fn kind(&self) -> RouteKind {
    self.kind
  }

  pub fn trigger(&self) -> &str {
    &self.trigger
  }

  pub fn gate(&self) -> &Gate {
    &self.gate
  }

  pub(crate) fn handler(&self) -> &Handler<S> {
    &self.handler
  }
}

#[cfg(test)]
mod tests {
  use crate::test::TestServices;
  use super::{Gate, Route, RouteKind};

  #[test]
  fn command_trigger_drops_slash() {
    let route: Route<TestServices> = Route::new(RouteKind::Command, "/start", Gate::Open, |_ctx, _args| ());
    assert_eq!(route.trigger(), "start");

    let route: Route<TestServices> = Route::new(RouteKind::Text, "/start", Gate::Open, |_ctx, _args| ());
    assert_eq!(route.trigger(), "/start");
  }

  #[test]
  fn gate_capability() {
    assert_eq!(Gate::Open.capability("x"), None);
    assert_eq!(Gate::Capability("list_users".to_owned()).capability("x"), Some("list_users"));
    assert_eq!(Gate::Argument.capability("change_name"), Some("change_name"));
  }
}
