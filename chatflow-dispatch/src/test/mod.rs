use std::sync::Mutex;
use chatflow_base::UserId;
use chatflow_port::{AccessManager, Keyboard, ReplyError, ReplySink, Services, TemplateParams};

/// The one capability nobody holds
pub const DENIED: &str = "list_users";

#[derive(Debug, Default)]
pub struct TestServices {
  sent: Mutex<Vec<(UserId, String)>>,
  logged: Mutex<Vec<(UserId, String)>>,
}

impl TestServices {
  pub fn replies_to(&self, user: UserId) -> Vec<String> {
    self.sent.lock().unwrap()
      .iter()
      .filter(|(to, _)| *to == user)
      .map(|(_, text)| text.clone())
      .collect()
  }

  pub fn logged_access(&self) -> Vec<(UserId, String)> {
    self.logged.lock().unwrap().clone()
  }
}

impl ReplySink for TestServices {
  fn reply(&self, user: UserId, text: &str, _keyboard: Option<&Keyboard>) -> Result<(), ReplyError> {
    self.sent.lock().unwrap().push((user, text.to_owned()));
    Ok(())
  }

  fn reply_template(&self, user: UserId, template: &str, _params: &TemplateParams, keyboard: Option<&Keyboard>)
    -> Result<(), ReplyError>
  {
    self.reply(user, &format!("template:{}", template), keyboard)
  }
}

impl AccessManager for TestServices {
  fn check_capability(&self, _user: UserId, capability: &str) -> bool {
    capability != DENIED
  }

  fn log_access(&self, user: UserId, capability: &str) {
    self.logged.lock().unwrap().push((user, capability.to_owned()));
  }
}

impl Services for TestServices {
  fn replies(&self) -> &dyn ReplySink {
    self
  }

  fn access(&self) -> &dyn AccessManager {
    self
  }
}
