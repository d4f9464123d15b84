use std::sync::{Arc, Mutex};
use chatflow::{Dispatcher, EngineConfig, Event, EventOutcome};
use chatflow::base::UserId;
use chatflow::port::{Keyboard, ReplyError, TemplateParams, TemplateSet};
use chatflow::prelude::ReplySink;
use chatflow_test_util::test_id;
use crate::users::{MemoryUserStore, Role, UserRecord, UserStore};
use crate::replies::templates;
use crate::{app, Amount, AppServices};


type Sent = Arc<Mutex<Vec<(UserId, String, Option<Keyboard>)>>>;

/// Reply sink that renders templates and keeps everything it was asked to send
struct Transcript {
  templates: TemplateSet,
  sent: Sent,
}

impl ReplySink for Transcript {
  fn reply(&self, user: UserId, text: &str, keyboard: Option<&Keyboard>) -> Result<(), ReplyError> {
    self.sent.lock().unwrap().push((user, text.to_owned(), keyboard.cloned()));
    Ok(())
  }

  fn reply_template(&self, user: UserId, template: &str, params: &TemplateParams, keyboard: Option<&Keyboard>)
    -> Result<(), ReplyError>
  {
    let text = self.templates.render(template, params)?;
    self.reply(user, &text, keyboard)
  }
}

pub fn user(name: &str, role: Role, balance: &str) -> UserRecord {
  UserRecord::new(test_id!(UserId), name, role, balance.parse().unwrap())
}

/// The whole bot with an in-memory transcript
pub struct Bot {
  pub dispatcher: Dispatcher<AppServices>,
  pub users: Arc<MemoryUserStore>,
  sent: Sent,
}

impl Bot {
  pub fn new(users: Vec<UserRecord>) -> Self {
    Self::with_config(users, EngineConfig::default())
  }

  pub fn with_config(users: Vec<UserRecord>, config: EngineConfig) -> Self {
    let users = Arc::new(MemoryUserStore::with_users(users));
    let sent = Sent::default();
    let transcript = Transcript { templates: templates().unwrap(), sent: sent.clone() };
    let dispatcher = app(users.clone(), Box::new(transcript), config).unwrap();
    Bot { dispatcher, users, sent }
  }

  pub fn send(&self, user: &UserRecord, text: &str) -> EventOutcome {
    self.dispatcher.handle_event(user.id, &Event::message(text))
  }

  pub fn press(&self, user: &UserRecord, data: &str) -> EventOutcome {
    self.dispatcher.handle_event(user.id, &Event::callback(data))
  }

  pub fn replies(&self, user: &UserRecord) -> Vec<String> {
    self.sent.lock().unwrap()
      .iter()
      .filter(|(to, _, _)| *to == user.id)
      .map(|(_, text, _)| text.clone())
      .collect()
  }

  pub fn last_reply(&self, user: &UserRecord) -> Option<String> {
    self.replies(user).pop()
  }

  pub fn last_keyboard(&self, user: &UserRecord) -> Option<Keyboard> {
    self.sent.lock().unwrap()
      .iter()
      .rev()
      .find(|(to, _, _)| *to == user.id)
      .and_then(|(_, _, keyboard)| keyboard.clone())
  }

  pub fn balance(&self, user: &UserRecord) -> Amount {
    self.users.get(user.id).unwrap().balance
  }

  /// Active flow and step index
  pub fn position(&self, user: &UserRecord) -> Option<(String, usize)> {
    let session = self.dispatcher.store().get(user.id);
    Some((session.flow_name()?.to_owned(), session.step_index()?))
  }
}
