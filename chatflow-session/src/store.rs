use std::sync::Arc;
use std::time::Instant;
use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};
use tracing::{event, warn, Level};
use chatflow_base::UserId;
use chatflow_data::{ContextKey, ContextValue};
use chatflow_port::Services;
use crate::{EngineConfig, FlowContext, FlowError, FlowRegistry, Session, StepTransition};

/// Owns every user's [`Session`].
///
/// Each session sits behind its own lock: events for one user are handled one at a time, events for
/// different users in parallel. The map is sharded, so only users landing in the same shard contend on a lookup.
///
/// # Examples
/// ```
/// # use std::sync::Arc;
/// # use chatflow_base::UserId;
/// # use chatflow_port::{AllowAll, AccessManager, Keyboard, ReplyError, ReplySink, Services, TemplateParams};
/// # use chatflow_session::{FlowBuilder, FlowRegistry, SessionStore, Step, EngineConfig};
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
/// let mut registry = FlowRegistry::new();
/// registry.register(FlowBuilder::new("survey").step(Step::new("q1")).step(Step::new("q2")).build().unwrap()).unwrap();
///
/// let store = SessionStore::new(registry, Arc::new(App), EngineConfig::default());
/// let user = UserId::new(42);
/// store.start_flow(user, "survey").unwrap();
/// store.advance(user).unwrap();
/// assert_eq!(store.get(user).step_index(), Some(1));
/// ```
pub struct SessionStore<S> {
  sessions: DashMap<UserId, Arc<Mutex<Session>>>,
  registry: Arc<FlowRegistry<S>>,
  services: Arc<S>,
  config: EngineConfig,
}

impl<S> std::fmt::Debug for SessionStore<S> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SessionStore")
      .field("users", &self.sessions.len())
      .field("registry", &self.registry)
      .field("config", &self.config)
      .finish()
  }
}

/// A locked session. A hook that panics leaves the session half way through a transition,
/// so it goes back to idle, without running any hooks, as the panic unwinds.
struct Locked<'m> {
  session: MutexGuard<'m, Session>,
}

impl Drop for Locked<'_> {
  fn drop(&mut self) {
    if std::thread::panicking() {
      warn!(user = %self.session.user(), flow = ?self.session.flow_name(), "hook panicked, resetting session to idle");
      self.session.reset();
    }
  }
}

impl<S: Services> SessionStore<S> {
  pub fn new(registry: FlowRegistry<S>, services: Arc<S>, config: EngineConfig) -> Self {
    SessionStore {
      sessions: DashMap::new(),
      registry: Arc::new(registry),
      services,
      config,
    }
  }

  pub fn registry(&self) -> &FlowRegistry<S> {
    &self.registry
  }

  pub fn services(&self) -> &Arc<S> {
    &self.services
  }

  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  /// Number of users seen so far
  pub fn len(&self) -> usize {
    self.sessions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.sessions.is_empty()
  }

  fn slot(&self, user: UserId) -> Arc<Mutex<Session>> {
    self.sessions
      .entry(user)
      .or_insert_with(|| Arc::new(Mutex::new(Session::new(user))))
      .value()
      .clone()
  }

  fn locked<R, F>(&self, user: UserId, touch: bool, f: F) -> R
      where F: FnOnce(&mut FlowContext<'_, S>) -> R
  {
    let slot = self.slot(user);
    let mut locked = Locked { session: slot.lock() };
    if touch {
      locked.session.touch(Instant::now());
    }
    let mut ctx = FlowContext::new(&mut locked.session, &self.registry, &self.services, &self.config);
    f(&mut ctx)
  }

  /// Run `f` with exclusive access to `user`'s session, creating it if needed.
  ///
  /// Counts as activity for idle expiry.
  pub fn with_session<R, F>(&self, user: UserId, f: F) -> R
      where F: FnOnce(&mut FlowContext<'_, S>) -> R
  {
    self.locked(user, true, f)
  }

  /// Snapshot of `user`'s session; an idle one for users never seen before
  pub fn get(&self, user: UserId) -> Session {
    self.slot(user).lock().clone()
  }

  pub fn start_flow(&self, user: UserId, name: &str) -> Result<(), FlowError> {
    self.with_session(user, |ctx| ctx.start_flow(name))
  }

  pub fn advance(&self, user: UserId) -> Result<StepTransition, FlowError> {
    self.with_session(user, |ctx| ctx.advance())
  }

  /// Cancel `user`'s active flow. [`FlowError::NoActiveFlow`] when idle.
  pub fn cancel(&self, user: UserId) -> Result<(), FlowError> {
    self.with_session(user, |ctx| ctx.cancel_flow())
  }

  pub fn is_in_flow(&self, user: UserId) -> bool {
    self.get(user).is_active()
  }

  /// Write to the session's context without counting as activity
  pub fn set_context<T>(&self, user: UserId, key: &ContextKey<T>, value: T)
      where T: ContextValue + 'static
  {
    self.locked(user, false, |ctx| ctx.set(key, value))
  }

  pub fn get_context<T>(&self, user: UserId, key: &ContextKey<T>) -> Option<T>
      where T: Clone + 'static
  {
    self.locked(user, false, |ctx| ctx.get(key).cloned())
  }

  /// Cancel every active session idle since before `now - idle_timeout`, firing `on_cancel`.
  ///
  /// Sessions busy with an event are skipped. Returns the users whose flow expired.
  pub fn expire_idle(&self, now: Instant) -> Vec<UserId> {
    let timeout = match self.config.idle_timeout() {
      Some(timeout) => timeout,
      None => return vec![],
    };

    // no map guard is held while hooks run
    let slots = self.sessions
      .iter()
      .map(|entry| entry.value().clone())
      .collect::<Vec<_>>();

    let mut expired = vec![];
    for slot in slots {
      let mut locked = match slot.try_lock() {
        Some(session) => Locked { session },
        None => continue,
      };
      if !locked.session.is_active() || now.saturating_duration_since(locked.session.last_active()) < timeout {
        continue;
      }

      let user = locked.session.user();
      event!(Level::INFO, %user, flow = ?locked.session.flow_name(), "session idle, expiring");
      let mut ctx = FlowContext::new(&mut locked.session, &self.registry, &self.services, &self.config);
      match ctx.cancel_flow() {
        Ok(()) => expired.push(user),
        Err(err) => warn!(%user, error = %err, "could not expire session"),
      }
    }
    expired
  }
}
