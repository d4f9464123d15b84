use std::sync::Arc;
use tracing::info;
use chatflow::base::UserId;
use chatflow::prelude::AccessManager;
use crate::users::{Role, UserStore};

pub const CHANGE_NAME: &str = "change_name";
pub const TRANSFER_BALANCE: &str = "transfer_balance";
pub const VIEW_PROFILE: &str = "view_profile";
pub const LIST_USERS: &str = "list_users";

impl Role {
  pub fn has_capability(&self, capability: &str) -> bool {
    match self {
      Role::Admin => true,
      Role::User => [CHANGE_NAME, TRANSFER_BALANCE, VIEW_PROFILE].contains(&capability),
      Role::Guest => capability == VIEW_PROFILE,
    }
  }
}

/// Grants capabilities by the user's [`Role`]. Users without a record are guests.
pub struct RoleAccessManager {
  users: Arc<dyn UserStore>,
}

impl RoleAccessManager {
  pub fn new(users: Arc<dyn UserStore>) -> Self {
    RoleAccessManager { users }
  }

  pub fn role(&self, user: UserId) -> Role {
    self.users.get(user).map(|record| record.role).unwrap_or(Role::Guest)
  }
}

impl AccessManager for RoleAccessManager {
  fn check_capability(&self, user: UserId, capability: &str) -> bool {
    self.role(user).has_capability(capability)
  }

  fn log_access(&self, user: UserId, capability: &str) {
    info!(target: "audit", %user, role = %self.role(user), capability, "access granted");
  }
}
