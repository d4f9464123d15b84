use std::sync::Arc;
use chatflow::prelude::{AccessManager, ReplySink, Services};
use crate::access::RoleAccessManager;
use crate::users::UserStore;

/// Everything the bot's flows and handlers use
pub struct AppServices {
  users: Arc<dyn UserStore>,
  access: RoleAccessManager,
  replies: Box<dyn ReplySink>,
}

impl AppServices {
  pub fn new(users: Arc<dyn UserStore>, replies: Box<dyn ReplySink>) -> Self {
    AppServices {
      access: RoleAccessManager::new(users.clone()),
      users,
      replies,
    }
  }

  pub fn users(&self) -> &dyn UserStore {
    &*self.users
  }
}

impl Services for AppServices {
  fn replies(&self) -> &dyn ReplySink {
    &*self.replies
  }

  fn access(&self) -> &dyn AccessManager {
    &self.access
  }
}
