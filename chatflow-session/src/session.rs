use std::time::Instant;
use chatflow_base::UserId;
use chatflow_data::{ContextData, ContextKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize))]
pub enum SessionStatus {
  Idle,
  Active,
}

/// Where one user is in their conversation.
///
/// A session is created idle the first time a user is seen and is never destroyed, only reset.
/// While active, `step_index` always points into the active flow's steps.
#[derive(Debug, Clone)]
pub struct Session {
  user: UserId,
  flow: Option<String>,
  step_index: usize,
  context: ContextData,

  // bumped on every transition so callers can tell whether a hook moved the session
  epoch: u64,
  last_active: Instant,
}

impl Session {
  pub fn new(user: UserId) -> Self {
    Session {
      user,
      flow: None,
      step_index: 0,
      context: ContextData::new(),
      epoch: 0,
      last_active: Instant::now(),
    }
  }

  pub fn user(&self) -> UserId {
    self.user
  }

  pub fn status(&self) -> SessionStatus {
    match self.flow {
      Some(_) => SessionStatus::Active,
      None => SessionStatus::Idle,
    }
  }

  pub fn is_active(&self) -> bool {
    self.flow.is_some()
  }

  /// Name of the active flow
  pub fn flow_name(&self) -> Option<&str> {
    self.flow.as_deref()
  }

  /// Index of the current step, only while active
  pub fn step_index(&self) -> Option<usize> {
    self.flow.as_ref().map(|_| self.step_index)
  }

  pub fn context(&self) -> &ContextData {
    &self.context
  }

  pub fn get<T>(&self, key: &ContextKey<T>) -> Option<&T>
      where T: 'static
  {
    self.context.get(key)
  }

  pub fn last_active(&self) -> Instant {
    self.last_active
  }

  pub(crate) fn context_mut(&mut self) -> &mut ContextData {
    &mut self.context
  }

  pub(crate) fn epoch(&self) -> u64 {
    self.epoch
  }

  pub(crate) fn touch(&mut self, now: Instant) {
    self.last_active = now;
  }

  /// Enter step 0 of `flow` with a fresh context
  pub(crate) fn activate(&mut self, flow: &str) {
    self.flow = Some(flow.to_owned());
    self.step_index = 0;
    self.context.clear();
    self.epoch += 1;
  }

  pub(crate) fn move_to(&mut self, step_index: usize) {
    self.step_index = step_index;
    self.epoch += 1;
  }

  /// Back to idle, discarding the flow's context
  pub(crate) fn reset(&mut self) {
    self.flow = None;
    self.step_index = 0;
    self.context.clear();
    self.epoch += 1;
  }
}

#[cfg(test)]
mod tests {
  use chatflow_base::UserId;
  use chatflow_data::ContextKey;
  use chatflow_test_util::test_id;
  use super::{Session, SessionStatus};

  const NAME: ContextKey<String> = ContextKey::new("name");

  #[test]
  fn lifecycle() {
    let user = test_id!(UserId);
    let mut session = Session::new(user);
    assert_eq!(session.user(), user);
    assert_eq!(session.status(), SessionStatus::Idle);
    assert_eq!(session.step_index(), None);

    session.context_mut().set(&NAME, "stale".to_owned());
    session.activate("change_name");
    assert_eq!(session.status(), SessionStatus::Active);
    assert_eq!(session.flow_name(), Some("change_name"));
    assert_eq!(session.step_index(), Some(0));
    assert!(session.context().is_empty());

    session.context_mut().set(&NAME, "Al".to_owned());
    session.move_to(1);
    assert_eq!(session.step_index(), Some(1));
    assert_eq!(session.get(&NAME).map(String::as_str), Some("Al"));

    session.reset();
    assert!(!session.is_active());
    assert_eq!(session.flow_name(), None);
    assert!(session.context().is_empty());
  }

  #[test]
  fn epoch_moves_on_every_transition() {
    let mut session = Session::new(test_id!(UserId));
    let start = session.epoch();
    session.activate("a");
    session.move_to(1);
    session.reset();
    assert_eq!(session.epoch(), start + 3);
  }
}
