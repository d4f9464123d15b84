use std::collections::HashSet;
use crate::{FlowContext, FlowError, Hook, Step};

/// An ordered, immutable list of [`Step`]s with hooks for finishing.
///
/// Built with a [`FlowBuilder`] and registered once in a [`FlowRegistry`](crate::FlowRegistry).
pub struct Flow<S> {
  name: String,
  steps: Vec<Step<S>>,
  on_complete: Option<Hook<S>>,
  on_cancel: Option<Hook<S>>,
  cancel_command: Option<String>,
}

impl<S> std::fmt::Debug for Flow<S> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Flow")
      .field("name", &self.name)
      .field("steps", &self.steps)
      .field("cancel_command", &self.cancel_command)
      .finish()
  }
}

impl<S> Flow<S> {
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn steps(&self) -> &[Step<S>] {
    &self.steps
  }

  pub fn step(&self, index: usize) -> Option<&Step<S>> {
    self.steps.get(index)
  }

  /// Index of the step called `name`
  pub fn step_index(&self, name: &str) -> Option<usize> {
    self.steps.iter().position(|step| step.name() == name)
  }

  /// Never zero: a flow without steps cannot be built
  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_last(&self, index: usize) -> bool {
    index + 1 == self.steps.len()
  }

  /// Text that cancels this flow from any step
  pub fn cancel_command(&self) -> Option<&str> {
    self.cancel_command.as_deref()
  }

  pub(crate) fn complete_hook(&self) -> Option<&Hook<S>> {
    self.on_complete.as_ref()
  }

  pub(crate) fn cancel_hook(&self) -> Option<&Hook<S>> {
    self.on_cancel.as_ref()
  }
}


/// Builds a [`Flow`]
///
/// ```
/// # use chatflow_session::{FlowBuilder, Step};
/// # use chatflow_port::{AllowAll, ReplySink, Services};
/// # struct App;
/// # impl Services for App {
/// #   fn replies(&self) -> &dyn ReplySink { unimplemented!() }
/// #   fn access(&self) -> &dyn chatflow_port::AccessManager { &AllowAll }
/// # }
/// let flow = FlowBuilder::<App>::new("change_name")
///   .step(Step::new("new_name"))
///   .step(Step::new("confirm"))
///   .cancel_command("/cancel")
///   .on_cancel(|ctx| ctx.reply("Name change cancelled"))
///   .build()
///   .unwrap();
/// assert_eq!(flow.step_index("confirm"), Some(1));
/// ```
pub struct FlowBuilder<S> {
  flow: Flow<S>,
}

impl<S: 'static> FlowBuilder<S> {
  pub fn new<STR>(name: STR) -> Self
      where STR: Into<String>
  {
    FlowBuilder {
      flow: Flow {
        name: name.into(),
        steps: Vec::new(),
        on_complete: None,
        on_cancel: None,
        cancel_command: None,
      }
    }
  }

  /// Append a step
  pub fn step(mut self, step: Step<S>) -> Self {
    self.flow.steps.push(step);
    self
  }

  /// Run `hook` after the last step continues. The context data is still readable.
  pub fn on_complete<F>(mut self, hook: F) -> Self
      where F: Fn(&mut FlowContext<'_, S>) + Send + Sync + 'static
  {
    self.flow.on_complete = Some(Box::new(hook));
    self
  }

  /// Run `hook` when the flow is cancelled, superseded or expires. The context data is still readable.
  pub fn on_cancel<F>(mut self, hook: F) -> Self
      where F: Fn(&mut FlowContext<'_, S>) + Send + Sync + 'static
  {
    self.flow.on_cancel = Some(Box::new(hook));
    self
  }

  pub fn cancel_command<STR>(mut self, command: STR) -> Self
      where STR: Into<String>
  {
    self.flow.cancel_command = Some(command.into());
    self
  }

  pub fn build(self) -> Result<Flow<S>, FlowError> {
    let flow = self.flow;
    if flow.steps.is_empty() {
      return Err(FlowError::EmptyFlow(flow.name));
    }

    let dupe = {
      let mut seen = HashSet::new();
      flow.steps.iter().map(Step::name).find(|name| !seen.insert(*name)).map(str::to_owned)
    };
    if let Some(step) = dupe {
      return Err(FlowError::DuplicateStep { flow: flow.name, step });
    }

    Ok(flow)
  }
}
