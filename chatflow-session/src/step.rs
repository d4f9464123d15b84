use std::borrow::Cow;
use chatflow_data::Validator;
use crate::FlowContext;

/// What a user sent while a step was current
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'i> {
  /// A typed message. Commands arrive this way too, with their leading `/`.
  Text(&'i str),
  /// A button press carrying its callback data. This is the non-text input: validators never see it.
  Callback(&'i str),
}

impl<'i> Input<'i> {
  pub fn text(&self) -> Option<&'i str> {
    match *self {
      Input::Text(text) => Some(text),
      Input::Callback(_) => None,
    }
  }

  pub fn callback(&self) -> Option<&'i str> {
    match *self {
      Input::Callback(data) => Some(data),
      Input::Text(_) => None,
    }
  }
}

/// Returned by a step's input hook to decide where the session goes next
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
  /// Move to the next step, or complete the flow from the last one
  Continue,
  /// Remain on this step without replaying its enter hook
  Stay,
  /// Cancel the flow
  Cancel,
  /// Recoverable failure: the message is sent to the user and the session stays on this step
  Error(Cow<'static, str>),
}

impl StepOutcome {
  pub fn error<STR>(message: STR) -> Self
      where STR: Into<Cow<'static, str>>
  {
    StepOutcome::Error(message.into())
  }
}

/// Hook run with the session, e.g. on entering a step or finishing a flow
pub type Hook<S> = Box<dyn Fn(&mut FlowContext<'_, S>) + Send + Sync>;

/// Hook run for every input while its step is current
pub type InputHook<S> = Box<dyn Fn(&mut FlowContext<'_, S>, Input<'_>) -> StepOutcome + Send + Sync>;


/// A single step in a flow.
///
/// Without an input hook, any text continues and any button press stays.
///
/// ```
/// # use chatflow_session::{Step, StepOutcome};
/// # use chatflow_data::MinLength;
/// # use chatflow_port::{AllowAll, ReplySink, Services};
/// # struct App;
/// # impl Services for App {
/// #   fn replies(&self) -> &dyn ReplySink { unimplemented!() }
/// #   fn access(&self) -> &dyn chatflow_port::AccessManager { &AllowAll }
/// # }
/// let step: Step<App> = Step::new("new_name")
///   .validator(MinLength::new(2, "Name must be at least 2 characters long"))
///   .on_enter(|ctx| ctx.reply("What should we call you?"))
///   .on_input(|_ctx, _input| StepOutcome::Continue);
/// assert_eq!(step.name(), "new_name");
/// ```
pub struct Step<S> {
  name: String,
  validator: Option<Box<dyn Validator>>,
  on_enter: Option<Hook<S>>,
  on_input: InputHook<S>,
}

impl<S> std::fmt::Debug for Step<S> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Step")
      .field("name", &self.name)
      .field("validator", &self.validator)
      .field("on_enter", &self.on_enter.is_some())
      .finish()
  }
}

fn default_input<S>(_ctx: &mut FlowContext<'_, S>, input: Input<'_>) -> StepOutcome {
  match input {
    Input::Text(_) => StepOutcome::Continue,
    Input::Callback(_) => StepOutcome::Stay,
  }
}

impl<S: 'static> Step<S> {
  pub fn new<STR>(name: STR) -> Self
      where STR: Into<String>
  {
    Step {
      name: name.into(),
      validator: None,
      on_enter: None,
      on_input: Box::new(default_input::<S>),
    }
  }

  /// Check text input with `validator` before the input hook sees it
  pub fn validator<V>(mut self, validator: V) -> Self
      where V: Validator + 'static
  {
    self.validator = Some(Box::new(validator));
    self
  }

  /// Run `hook` each time this step becomes current
  pub fn on_enter<F>(mut self, hook: F) -> Self
      where F: Fn(&mut FlowContext<'_, S>) + Send + Sync + 'static
  {
    self.on_enter = Some(Box::new(hook));
    self
  }

  pub fn on_input<F>(mut self, hook: F) -> Self
      where F: Fn(&mut FlowContext<'_, S>, Input<'_>) -> StepOutcome + Send + Sync + 'static
  {
    self.on_input = Box::new(hook);
    self
  }
}

impl<S> Step<S> {
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn get_validator(&self) -> Option<&dyn Validator> {
    self.validator.as_deref()
  }

  pub(crate) fn enter_hook(&self) -> Option<&Hook<S>> {
    self.on_enter.as_ref()
  }

  pub(crate) fn input_hook(&self) -> &InputHook<S> {
    &self.on_input
  }
}

#[cfg(test)]
mod tests {
  use chatflow_data::{MinLength, Validator};
  use crate::test::TestServices;
  use super::{Input, Step, StepOutcome};

  #[test]
  fn input_accessors() {
    assert_eq!(Input::Text("hi").text(), Some("hi"));
    assert_eq!(Input::Text("hi").callback(), None);
    assert_eq!(Input::Callback("confirm").callback(), Some("confirm"));
    assert_eq!(Input::Callback("confirm").text(), None);
  }

  #[test]
  fn builder() {
    let step: Step<TestServices> = Step::new("amount")
      .validator(MinLength::new(1, "required"));
    assert_eq!(step.name(), "amount");
    assert!(step.get_validator().unwrap().validate("").is_err());
    assert!(step.enter_hook().is_none());

    let step = step.on_enter(|_ctx| ());
    assert!(step.enter_hook().is_some());
  }

  #[test]
  fn outcome_error() {
    assert_eq!(StepOutcome::error("broke"), StepOutcome::Error("broke".into()));
  }
}
