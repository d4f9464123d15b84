use std::sync::Arc;
use tracing::{debug, event, warn, Level};
use chatflow_base::UserId;
use chatflow_data::{ContextKey, ContextValue, Rejection};
use chatflow_port::{Keyboard, ReplyError, Services, TemplateParams};
use crate::{EngineConfig, Flow, FlowError, FlowRegistry, Input, Session, StartPolicy, StepOutcome};

/// What happened to a session as the result of one input
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize))]
pub enum StepTransition {
  /// The step's validator refused the text; nothing changed
  Rejected(Rejection),
  /// Moved to the step at this index
  Advanced { step: usize },
  Stayed,
  /// The input hook reported a recoverable error; its message was sent
  Failed(String),
  Completed,
  Cancelled,
  /// The input hook made its own transition (e.g. started another flow), so its outcome was dropped
  Superseded,
}

/// A user's session, locked for the duration of one event, together with everything hooks need.
///
/// Every hook and handler receives one of these. All transitions go through it, so a hook can start
/// or cancel flows without deadlocking on its own session.
pub struct FlowContext<'a, S> {
  session: &'a mut Session,
  registry: &'a FlowRegistry<S>,
  services: &'a S,
  config: &'a EngineConfig,

  // set while on_complete / on_cancel run
  closing: bool,
  deferred_start: Option<String>,
}

impl<'a, S: Services> FlowContext<'a, S> {
  pub(crate) fn new(session: &'a mut Session, registry: &'a FlowRegistry<S>, services: &'a S, config: &'a EngineConfig) -> Self {
    FlowContext {
      session,
      registry,
      services,
      config,
      closing: false,
      deferred_start: None,
    }
  }

  pub fn user(&self) -> UserId {
    self.session.user()
  }

  /// The application's services
  pub fn services(&self) -> &'a S {
    self.services
  }

  pub fn config(&self) -> &'a EngineConfig {
    self.config
  }

  pub fn session(&self) -> &Session {
    self.session
  }

  pub fn is_in_flow(&self) -> bool {
    self.session.is_active()
  }

  /// Name of the current step of the active flow
  pub fn current_step(&self) -> Option<String> {
    let flow = self.active_flow().ok()?;
    let index = self.session.step_index()?;
    flow.step(index).map(|step| step.name().to_owned())
  }

  pub fn get<T>(&self, key: &ContextKey<T>) -> Option<&T>
      where T: 'static
  {
    self.session.context().get(key)
  }

  /// Write to the session's context. Values written while idle are discarded by the next flow start.
  pub fn set<T>(&mut self, key: &ContextKey<T>, value: T)
      where T: ContextValue + 'static
  {
    self.session.context_mut().set(key, value);
  }

  pub fn remove<T>(&mut self, key: &ContextKey<T>) -> Option<T>
      where T: 'static
  {
    self.session.context_mut().remove(key)
  }

  pub fn reply(&self, text: &str) {
    self.log_reply(self.services.replies().reply(self.user(), text, None));
  }

  pub fn reply_with(&self, text: &str, keyboard: &Keyboard) {
    self.log_reply(self.services.replies().reply(self.user(), text, Some(keyboard)));
  }

  pub fn reply_template(&self, template: &str, params: &TemplateParams, keyboard: Option<&Keyboard>) {
    self.log_reply(self.services.replies().reply_template(self.user(), template, params, keyboard));
  }

  fn log_reply(&self, result: Result<(), ReplyError>) {
    if let Err(err) = result {
      warn!(user = %self.user(), error = %err, "reply failed");
    }
  }

  fn active_flow(&self) -> Result<Arc<Flow<S>>, FlowError> {
    let name = self.session.flow_name().ok_or(FlowError::NoActiveFlow)?;
    self.registry.lookup(name)
  }

  /// Start `name` at its first step.
  ///
  /// An already active flow is cancelled first or the start is refused, per [`StartPolicy`].
  /// Called from a finishing flow's hooks, the start happens once that flow has been reset.
  pub fn start_flow(&mut self, name: &str) -> Result<(), FlowError> {
    let flow = self.registry.lookup(name)?;

    if self.closing {
      debug!(user = %self.user(), flow = name, "deferring start until the current flow has finished");
      self.deferred_start = Some(name.to_owned());
      return Ok(());
    }

    if let Ok(active) = self.active_flow() {
      if self.config.start_policy == StartPolicy::Reject {
        return Err(FlowError::AlreadyInFlow(active.name().to_owned()));
      }
      event!(Level::INFO, user = %self.user(), flow = active.name(), superseded_by = name, "flow superseded");
      if let Some(dropped) = self.close(&active, false) {
        debug!(user = %self.user(), flow = %dropped, "dropping start requested while superseded");
      }
    }

    self.session.activate(flow.name());
    event!(Level::INFO, user = %self.user(), flow = flow.name(), "flow started");
    self.enter_step(&flow, 0);
    Ok(())
  }

  /// Cancel the active flow, firing its `on_cancel`. A no-op from inside a finishing flow's hooks.
  pub fn cancel_flow(&mut self) -> Result<(), FlowError> {
    if self.closing {
      return Ok(());
    }
    let flow = self.active_flow()?;
    event!(Level::INFO, user = %self.user(), flow = flow.name(), "flow cancelled");
    if let Some(next) = self.close(&flow, false) {
      self.start_flow(&next)?;
    }
    Ok(())
  }

  /// Move to the next step, or complete the flow from the last one
  pub fn advance(&mut self) -> Result<StepTransition, FlowError> {
    if self.closing {
      return Err(FlowError::NoActiveFlow);
    }
    let flow = self.active_flow()?;
    let index = self.session.step_index().ok_or(FlowError::NoActiveFlow)?;

    if flow.is_last(index) {
      event!(Level::INFO, user = %self.user(), flow = flow.name(), "flow completed");
      if let Some(next) = self.close(&flow, true) {
        self.start_flow(&next)?;
      }
      return Ok(StepTransition::Completed);
    }

    let next = index + 1;
    self.session.move_to(next);
    let epoch = self.session.epoch();
    self.enter_step(&flow, next);
    if self.session.epoch() != epoch {
      return Ok(StepTransition::Superseded);
    }
    Ok(StepTransition::Advanced { step: next })
  }

  /// Feed one input to the current step.
  ///
  /// The flow's cancel command is honoured first. Text then goes through the step's validator;
  /// a rejection is sent to the user and leaves the session untouched. Otherwise the step's input
  /// hook decides what happens next.
  pub fn handle_input(&mut self, input: Input<'_>) -> Result<StepTransition, FlowError> {
    let flow = self.active_flow()?;
    let index = self.session.step_index().ok_or(FlowError::NoActiveFlow)?;
    let step = flow.step(index).ok_or_else(|| FlowError::StepOutOfRange { flow: flow.name().to_owned(), index })?;

    if let (Some(command), Input::Text(text)) = (flow.cancel_command(), input) {
      if matches_command(command, text) {
        self.cancel_flow()?;
        return Ok(StepTransition::Cancelled);
      }
    }

    if let (Some(validator), Input::Text(text)) = (step.get_validator(), input) {
      if let Err(rejection) = validator.validate(text) {
        event!(Level::DEBUG, user = %self.user(), flow = flow.name(), step = step.name(), reason = %rejection.reason, "input rejected");
        self.reply(&self.config.rejection_text(rejection.message()));
        return Ok(StepTransition::Rejected(rejection));
      }
    }

    let epoch = self.session.epoch();
    let outcome = (step.input_hook())(&mut *self, input);
    if self.session.epoch() != epoch {
      debug!(user = %self.user(), flow = flow.name(), step = step.name(), ?outcome, "input hook moved the session, ignoring its outcome");
      return Ok(StepTransition::Superseded);
    }

    event!(Level::DEBUG, user = %self.user(), flow = flow.name(), step = step.name(), ?outcome);
    match outcome {
      StepOutcome::Continue => self.advance(),
      StepOutcome::Stay => Ok(StepTransition::Stayed),
      StepOutcome::Cancel => {
        self.cancel_flow()?;
        Ok(StepTransition::Cancelled)
      }
      StepOutcome::Error(message) => {
        self.reply(&message);
        Ok(StepTransition::Failed(message.into_owned()))
      }
    }
  }

  fn enter_step(&mut self, flow: &Flow<S>, index: usize) {
    if let Some(step) = flow.step(index) {
      event!(Level::DEBUG, user = %self.user(), flow = flow.name(), step = step.name(), "entering step");
      if let Some(hook) = step.enter_hook() {
        hook(&mut *self);
      }
    }
  }

  /// Run the finishing hook, then reset to idle. Returns a flow start the hook asked for.
  fn close(&mut self, flow: &Flow<S>, completed: bool) -> Option<String> {
    let hook = if completed { flow.complete_hook() } else { flow.cancel_hook() };
    self.closing = true;
    if let Some(hook) = hook {
      hook(&mut *self);
    }
    self.closing = false;
    self.session.reset();
    self.deferred_start.take()
  }
}

/// Whether `text` invokes `command`. Slash commands match on their first token, with any
/// `@botname` suffix and arguments ignored.
fn matches_command(command: &str, text: &str) -> bool {
  let text = text.trim();
  let name = match command.strip_prefix('/') {
    Some(name) => name,
    None => return text == command,
  };
  text.strip_prefix('/')
    .and_then(|rest| rest.split_whitespace().next())
    .and_then(|token| token.split('@').next())
    .map_or(false, |token| token == name)
}


#[cfg(test)]
mod tests {
  use chatflow_base::UserId;
  use chatflow_data::ContextKey;
  use chatflow_test_util::test_id;
  use crate::{EngineConfig, FlowBuilder, FlowError, FlowRegistry, Input, Session, Step, StepOutcome};
  use crate::test::{TestServices, Events};
  use super::{FlowContext, StepTransition};

  const PICKED: ContextKey<String> = ContextKey::new("picked");

  fn registry(events: &Events) -> FlowRegistry<TestServices> {
    let mut registry = FlowRegistry::new();

    let (e1, e2) = (events.clone(), events.clone());
    registry.register(FlowBuilder::<TestServices>::new("menu")
      .step(Step::new("pick")
        .on_input(|ctx, input| match input {
          Input::Callback("other") => {
            ctx.start_flow("other").unwrap();
            StepOutcome::Continue
          }
          Input::Callback(data) => {
            ctx.set(&PICKED, data.to_owned());
            StepOutcome::Continue
          }
          Input::Text(_) => StepOutcome::Stay,
        }))
      .on_complete(move |ctx| {
        e1.log(format!("menu:complete:{}", ctx.get(&PICKED).cloned().unwrap_or_default()));
        if ctx.get(&PICKED).map(String::as_str) == Some("chain") {
          ctx.start_flow("other").unwrap();
          // no-op while finishing
          ctx.cancel_flow().unwrap();
        }
      })
      .on_cancel(move |_ctx| e2.log("menu:cancel"))
      .build().unwrap()).unwrap();

    let (e3, e4) = (events.clone(), events.clone());
    registry.register(FlowBuilder::<TestServices>::new("other")
      .step(Step::new("first").on_enter(move |_ctx| e3.log("other:enter")))
      .on_cancel(move |_ctx| e4.log("other:cancel"))
      .build().unwrap()).unwrap();

    registry.register(FlowBuilder::<TestServices>::new("hop")
      .step(Step::new("one"))
      .step(Step::new("two").on_enter(|ctx| ctx.start_flow("other").unwrap()))
      .build().unwrap()).unwrap();

    let e5 = events.clone();
    registry.register(FlowBuilder::<TestServices>::new("chain_cancel")
      .step(Step::new("only"))
      .on_cancel(move |ctx| {
        e5.log("chain_cancel:cancel");
        ctx.start_flow("other").unwrap();
      })
      .build().unwrap()).unwrap();

    registry
  }

  #[test]
  fn hook_transition_supersedes_outcome() {
    let events = Events::default();
    let registry = registry(&events);
    let services = TestServices::default();
    let config = EngineConfig::default();
    let mut session = Session::new(test_id!(UserId));
    let mut ctx = FlowContext::new(&mut session, &registry, &services, &config);

    ctx.start_flow("menu").unwrap();
    assert_eq!(ctx.handle_input(Input::Callback("other")), Ok(StepTransition::Superseded));
    assert_eq!(ctx.session().flow_name(), Some("other"));
    assert_eq!(ctx.session().step_index(), Some(0));
    assert_eq!(events.take(), vec!["menu:cancel", "other:enter"]);
  }

  #[test]
  fn start_from_complete_hook_is_deferred() {
    let events = Events::default();
    let registry = registry(&events);
    let services = TestServices::default();
    let config = EngineConfig::default();
    let mut session = Session::new(test_id!(UserId));
    let mut ctx = FlowContext::new(&mut session, &registry, &services, &config);

    ctx.start_flow("menu").unwrap();
    assert_eq!(ctx.handle_input(Input::Callback("chain")), Ok(StepTransition::Completed));

    // menu completed without being cancelled, then "other" started fresh
    assert_eq!(events.take(), vec!["menu:complete:chain", "other:enter"]);
    assert_eq!(ctx.session().flow_name(), Some("other"));
    assert!(ctx.get(&PICKED).is_none());
  }

  #[test]
  fn callbacks_skip_validation() {
    let mut registry: FlowRegistry<TestServices> = FlowRegistry::new();
    registry.register(FlowBuilder::<TestServices>::new("ask")
      .step(Step::new("number")
        .validator(chatflow_data::DecimalValidator::new("numbers only"))
        .on_input(|_ctx, input| match input {
          Input::Callback(_) => StepOutcome::Stay,
          Input::Text(_) => StepOutcome::Continue,
        }))
      .build().unwrap()).unwrap();
    let services = TestServices::default();
    let config = EngineConfig::default();
    let user = test_id!(UserId);
    let mut session = Session::new(user);
    let mut ctx = FlowContext::new(&mut session, &registry, &services, &config);

    ctx.start_flow("ask").unwrap();
    assert_eq!(ctx.handle_input(Input::Callback("not a number")), Ok(StepTransition::Stayed));
    assert!(matches!(ctx.handle_input(Input::Text("abc")), Ok(StepTransition::Rejected(_))));
    assert_eq!(services.replies_to(user), vec!["numbers only"]);
    assert_eq!(ctx.current_step().as_deref(), Some("number"));
    assert_eq!(ctx.handle_input(Input::Text("12")), Ok(StepTransition::Completed));
    assert_eq!(ctx.handle_input(Input::Text("12")), Err(FlowError::NoActiveFlow));
  }

  #[test]
  fn enter_hook_transition_supersedes_advance() {
    let events = Events::default();
    let registry = registry(&events);
    let services = TestServices::default();
    let config = EngineConfig::default();
    let mut session = Session::new(test_id!(UserId));
    let mut ctx = FlowContext::new(&mut session, &registry, &services, &config);

    ctx.start_flow("hop").unwrap();
    assert_eq!(ctx.handle_input(Input::Text("hi")), Ok(StepTransition::Superseded));
    assert_eq!(ctx.session().flow_name(), Some("other"));
    assert_eq!(ctx.session().step_index(), Some(0));
    assert_eq!(events.take(), vec!["other:enter"]);
  }

  #[test]
  fn start_from_cancel_hook_is_deferred() {
    let events = Events::default();
    let registry = registry(&events);
    let services = TestServices::default();
    let config = EngineConfig::default();
    let mut session = Session::new(test_id!(UserId));
    let mut ctx = FlowContext::new(&mut session, &registry, &services, &config);

    ctx.start_flow("chain_cancel").unwrap();
    ctx.cancel_flow().unwrap();
    assert_eq!(events.take(), vec!["chain_cancel:cancel", "other:enter"]);
    assert_eq!(ctx.session().flow_name(), Some("other"));
    assert_eq!(ctx.session().step_index(), Some(0));
  }

  #[test]
  fn start_from_cancel_hook_dropped_when_superseded() {
    let events = Events::default();
    let registry = registry(&events);
    let services = TestServices::default();
    let config = EngineConfig::default();
    let mut session = Session::new(test_id!(UserId));
    let mut ctx = FlowContext::new(&mut session, &registry, &services, &config);

    ctx.start_flow("chain_cancel").unwrap();
    ctx.start_flow("menu").unwrap();
    assert_eq!(events.take(), vec!["chain_cancel:cancel"]);
    assert_eq!(ctx.session().flow_name(), Some("menu"));
    assert_eq!(ctx.session().step_index(), Some(0));
  }

  #[test]
  fn command_matching() {
    use super::matches_command;

    assert!(matches_command("/cancel", "/cancel"));
    assert!(matches_command("/cancel", "  /cancel "));
    assert!(matches_command("/cancel", "/cancel@bank_bot"));
    assert!(matches_command("/cancel", "/cancel now"));
    assert!(matches_command("/cancel", "/cancel@bank_bot now"));
    assert!(!matches_command("/cancel", "/cancellation"));
    assert!(!matches_command("/cancel", "cancel"));
    assert!(!matches_command("/cancel", "please /cancel"));
    assert!(matches_command("stop", " stop "));
    assert!(!matches_command("stop", "stop now"));
  }
}
