use std::sync::Arc;
use parking_lot::Mutex;
use chatflow_base::UserId;
use chatflow_port::{AccessManager, AllowAll, Keyboard, ReplyError, ReplySink, Services, TemplateParams};

/// Reply sink that remembers what was sent, or what it was asked to send when failing
#[derive(Debug, Default)]
pub struct RecordingReplies {
  sent: Mutex<Vec<(UserId, String, Option<Keyboard>)>>,
  fail: bool,
}

impl RecordingReplies {
  pub fn failing() -> Self {
    RecordingReplies { sent: Mutex::default(), fail: true }
  }
}

impl ReplySink for RecordingReplies {
  fn reply(&self, user: UserId, text: &str, keyboard: Option<&Keyboard>) -> Result<(), ReplyError> {
    self.sent.lock().push((user, text.to_owned(), keyboard.cloned()));
    if self.fail {
      return Err(ReplyError::Transport("connection reset".to_owned()));
    }
    Ok(())
  }

  fn reply_template(&self, user: UserId, template: &str, _params: &TemplateParams, keyboard: Option<&Keyboard>)
    -> Result<(), ReplyError>
  {
    self.reply(user, &format!("template:{}", template), keyboard)
  }
}

#[derive(Debug, Default)]
pub struct TestServices {
  pub replies: RecordingReplies,
  pub access: AllowAll,
}

impl Services for TestServices {
  fn replies(&self) -> &dyn ReplySink {
    &self.replies
  }

  fn access(&self) -> &dyn AccessManager {
    &self.access
  }
}

impl TestServices {
  pub fn failing() -> Self {
    TestServices { replies: RecordingReplies::failing(), access: AllowAll }
  }

  pub fn replies_to(&self, user: UserId) -> Vec<String> {
    self.replies.sent.lock()
      .iter()
      .filter(|(to, _, _)| *to == user)
      .map(|(_, text, _)| text.clone())
      .collect()
  }
}

/// Ordered log of hook calls, shared between closures
#[derive(Debug, Default, Clone)]
pub struct Events(Arc<Mutex<Vec<String>>>);

impl Events {
  pub fn log<STR>(&self, event: STR)
      where STR: Into<String>
  {
    self.0.lock().push(event.into());
  }

  pub fn take(&self) -> Vec<String> {
    std::mem::take(&mut *self.0.lock())
  }

  pub fn count(&self, event: &str) -> usize {
    self.0.lock().iter().filter(|logged| *logged == event).count()
  }
}
