use std::sync::Arc;
use chatflow_base::NamedStore;
use crate::{Flow, FlowError};

/// All flow definitions, by name.
///
/// Filled at startup and read-only once handed to a [`SessionStore`](crate::SessionStore).
pub struct FlowRegistry<S> {
  flows: NamedStore<Flow<S>>,
}

impl<S> std::fmt::Debug for FlowRegistry<S> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_list().entries(self.names()).finish()
  }
}

impl<S> FlowRegistry<S> {
  pub fn new() -> Self {
    FlowRegistry { flows: NamedStore::new() }
  }

  /// Register a flow. Names are unique; a clash means the bot is misconfigured.
  pub fn register(&mut self, flow: Flow<S>) -> Result<(), FlowError> {
    let name = flow.name().to_owned();
    self.flows
      .register(name, flow)
      .map(|_| ())
      .map_err(FlowError::from)
  }

  pub fn lookup(&self, name: &str) -> Result<Arc<Flow<S>>, FlowError> {
    self.flows.lookup(name).map_err(FlowError::from)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.flows.contains(name)
  }

  /// Flow names in registration order
  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.flows.iter().map(|(name, _)| name)
  }

  pub fn len(&self) -> usize {
    self.flows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.flows.is_empty()
  }
}

impl<S> Default for FlowRegistry<S> {
  fn default() -> Self {
    Self::new()
  }
}
