use std::sync::Arc;
use std::time::Instant;
use tracing::{event, warn, Level};
use chatflow_base::{NamedStore, UserId};
use chatflow_data::{ContextKey, ContextValue};
use chatflow_port::Services;
use chatflow_session::{FlowContext, FlowError, SessionStore, StepTransition};
use crate::{Command, DispatchError, Event, Gate, Route, RouteKind};

/// What the [`Dispatcher`] did with an event
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize))]
pub enum EventOutcome {
  /// Nothing matched. The user gets no reply.
  Ignored,
  /// A route's handler ran
  Handled,
  /// A gated route was refused and the denial text sent
  PermissionDenied { capability: String },
  /// The event went to the active flow's current step
  Step(StepTransition),
}

/// Collects routes at startup.
///
/// ```
/// # use std::sync::Arc;
/// # use chatflow_base::UserId;
/// # use chatflow_port::{AccessManager, AllowAll, Keyboard, ReplyError, ReplySink, Services, TemplateParams};
/// # use chatflow_session::{EngineConfig, FlowRegistry, SessionStore};
/// # use chatflow_dispatch::{DispatcherBuilder, Event, EventOutcome};
/// # struct Quiet;
/// # impl ReplySink for Quiet {
/// #   fn reply(&self, _: UserId, _: &str, _: Option<&Keyboard>) -> Result<(), ReplyError> { Ok(()) }
/// #   fn reply_template(&self, _: UserId, _: &str, _: &TemplateParams, _: Option<&Keyboard>) -> Result<(), ReplyError> { Ok(()) }
/// # }
/// # struct App;
/// # impl Services for App {
/// #   fn replies(&self) -> &dyn ReplySink { &Quiet }
/// #   fn access(&self) -> &dyn AccessManager { &AllowAll }
/// # }
/// let store = SessionStore::new(FlowRegistry::new(), Arc::new(App), EngineConfig::default());
/// let dispatcher = DispatcherBuilder::<App>::new()
///   .command("start", |ctx, _args| ctx.reply("Welcome!"))
///   .gated_command("users", "list_users", |ctx, _args| ctx.reply("1 user"))
///   .build(store)
///   .unwrap();
///
/// let outcome = dispatcher.handle_event(UserId::new(1), &Event::message("/start"));
/// assert_eq!(outcome, EventOutcome::Handled);
/// ```
pub struct DispatcherBuilder<S> {
  routes: Vec<Route<S>>,
}

impl<S: Services> DispatcherBuilder<S> {
  pub fn new() -> Self {
    DispatcherBuilder { routes: Vec::new() }
  }

  pub fn route(mut self, route: Route<S>) -> Self {
    self.routes.push(route);
    self
  }

  /// Route `/name` (with or without the slash in `name`)
  pub fn command<STR, F>(self, name: STR, handler: F) -> Self
      where STR: Into<String>,
            F: Fn(&mut FlowContext<'_, S>, &str) + Send + Sync + 'static
  {
    self.route(Route::new(RouteKind::Command, name, Gate::Open, handler))
  }

  pub fn gated_command<STR, CAP, F>(self, name: STR, capability: CAP, handler: F) -> Self
      where STR: Into<String>,
            CAP: Into<String>,
            F: Fn(&mut FlowContext<'_, S>, &str) + Send + Sync + 'static
  {
    self.route(Route::new(RouteKind::Command, name, Gate::Capability(capability.into()), handler))
  }

  pub fn text<STR, F>(self, text: STR, handler: F) -> Self
      where STR: Into<String>,
            F: Fn(&mut FlowContext<'_, S>, &str) + Send + Sync + 'static
  {
    self.route(Route::new(RouteKind::Text, text, Gate::Open, handler))
  }

  pub fn gated_text<STR, CAP, F>(self, text: STR, capability: CAP, handler: F) -> Self
      where STR: Into<String>,
            CAP: Into<String>,
            F: Fn(&mut FlowContext<'_, S>, &str) + Send + Sync + 'static
  {
    self.route(Route::new(RouteKind::Text, text, Gate::Capability(capability.into()), handler))
  }

  pub fn callback_prefix<STR, F>(self, prefix: STR, handler: F) -> Self
      where STR: Into<String>,
            F: Fn(&mut FlowContext<'_, S>, &str) + Send + Sync + 'static
  {
    self.route(Route::new(RouteKind::CallbackPrefix, prefix, Gate::Open, handler))
  }

  pub fn gated_callback_prefix<STR, F>(self, prefix: STR, gate: Gate, handler: F) -> Self
      where STR: Into<String>,
            F: Fn(&mut FlowContext<'_, S>, &str) + Send + Sync + 'static
  {
    self.route(Route::new(RouteKind::CallbackPrefix, prefix, gate, handler))
  }

  /// Check the routes and attach them to `store`.
  ///
  /// Each trigger may be registered once per [`RouteKind`] and can't be empty.
  pub fn build(self, store: SessionStore<S>) -> Result<Dispatcher<S>, DispatchError> {
    let mut dispatcher = Dispatcher {
      store,
      commands: NamedStore::new(),
      texts: NamedStore::new(),
      callbacks: NamedStore::new(),
    };

    for route in self.routes {
      let (kind, trigger) = (route.kind(), route.trigger().trim().to_owned());
      if trigger.is_empty() {
        return Err(DispatchError::EmptyTrigger(kind));
      }
      let routes = match kind {
        RouteKind::Command => &mut dispatcher.commands,
        RouteKind::Text => &mut dispatcher.texts,
        RouteKind::CallbackPrefix => &mut dispatcher.callbacks,
      };
      routes.register(trigger.clone(), route)
        .map_err(|_| DispatchError::DuplicateRoute { kind, trigger })?;
    }
    Ok(dispatcher)
  }
}

impl<S: Services> Default for DispatcherBuilder<S> {
  fn default() -> Self {
    Self::new()
  }
}


/// Single entry point for inbound events.
///
/// Routing, in order:
/// 1. a user in a flow has every event, commands included, fed to the current step
/// 2. `/command` by exact name
/// 3. text by exact match
/// 4. callback data by the longest matching prefix
///
/// Anything else is ignored without a reply.
pub struct Dispatcher<S> {
  store: SessionStore<S>,
  commands: NamedStore<Route<S>>,
  texts: NamedStore<Route<S>>,
  callbacks: NamedStore<Route<S>>,
}

impl<S> std::fmt::Debug for Dispatcher<S> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Dispatcher")
      .field("store", &self.store)
      .field("commands", &self.commands.iter().map(|(name, _)| name).collect::<Vec<_>>())
      .field("texts", &self.texts.iter().map(|(name, _)| name).collect::<Vec<_>>())
      .field("callbacks", &self.callbacks.iter().map(|(name, _)| name).collect::<Vec<_>>())
      .finish()
  }
}

impl<S: Services> Dispatcher<S> {
  pub fn store(&self) -> &SessionStore<S> {
    &self.store
  }

  pub fn services(&self) -> &Arc<S> {
    self.store.services()
  }

  /// Registered command names, in registration order
  pub fn commands(&self) -> impl Iterator<Item = &str> {
    self.commands.iter().map(|(name, _)| name)
  }

  /// Handle one inbound event for `user`. Events for the same user are handled one at a time.
  pub fn handle_event(&self, user: UserId, event: &Event) -> EventOutcome {
    self.store.with_session(user, |ctx| {
      if ctx.is_in_flow() {
        return match ctx.handle_input(event.as_input()) {
          Ok(transition) => EventOutcome::Step(transition),
          Err(err) => {
            warn!(%user, error = %err, "active flow could not take input");
            EventOutcome::Ignored
          }
        };
      }

      match self.find_route(event) {
        Some((route, argument)) => Self::run(ctx, &route, argument),
        None => {
          event!(Level::DEBUG, %user, ?event, "no route, ignoring");
          EventOutcome::Ignored
        }
      }
    })
  }

  fn find_route<'e>(&self, event: &'e Event) -> Option<(Arc<Route<S>>, &'e str)> {
    match event {
      Event::Message(text) => {
        if let Some(command) = Command::parse(text) {
          if let Some(route) = self.commands.get(command.name) {
            return Some((route, command.args));
          }
        }
        let text = text.trim();
        self.texts.get(text).map(|route| (route, text))
      }
      Event::Callback(data) => {
        self.callbacks
          .iter()
          .filter(|(prefix, _)| data.starts_with(*prefix))
          .max_by_key(|(prefix, _)| prefix.len())
          .map(|(prefix, route)| (route.clone(), &data[prefix.len()..]))
      }
    }
  }

  fn run(ctx: &mut FlowContext<'_, S>, route: &Route<S>, argument: &str) -> EventOutcome {
    let user = ctx.user();
    if let Some(capability) = route.gate().capability(argument) {
      let access = ctx.services().access();
      if !access.check_capability(user, capability) {
        event!(Level::INFO, %user, capability, trigger = route.trigger(), "permission denied");
        ctx.reply(&ctx.config().permission_denied_text);
        return EventOutcome::PermissionDenied { capability: capability.to_owned() };
      }
      access.log_access(user, capability);
    }

    event!(Level::DEBUG, %user, kind = ?route.kind(), trigger = route.trigger(), "running handler");
    (route.handler())(ctx, argument);
    EventOutcome::Handled
  }

  pub fn start_flow(&self, user: UserId, name: &str) -> Result<(), FlowError> {
    self.store.start_flow(user, name)
  }

  pub fn cancel_flow(&self, user: UserId) -> Result<(), FlowError> {
    self.store.cancel(user)
  }

  pub fn is_in_flow(&self, user: UserId) -> bool {
    self.store.is_in_flow(user)
  }

  pub fn set_context<T>(&self, user: UserId, key: &ContextKey<T>, value: T)
      where T: ContextValue + 'static
  {
    self.store.set_context(user, key, value)
  }

  pub fn get_context<T>(&self, user: UserId, key: &ContextKey<T>) -> Option<T>
      where T: Clone + 'static
  {
    self.store.get_context(user, key)
  }

  /// See [`SessionStore::expire_idle`]
  pub fn expire_idle(&self, now: Instant) -> Vec<UserId> {
    self.store.expire_idle(now)
  }
}
