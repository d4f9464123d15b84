use chatflow_base::UserId;

/// Decides whether a user holds a capability
pub trait AccessManager: Send + Sync {
  fn check_capability(&self, user: UserId, capability: &str) -> bool;

  /// Audit hook, called once a capability check has passed and the gated work is about to run
  fn log_access(&self, user: UserId, capability: &str);
}

/// AccessManager that grants everything. Useful for bots without gated handlers.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl AccessManager for AllowAll {
  fn check_capability(&self, _user: UserId, _capability: &str) -> bool {
    true
  }

  fn log_access(&self, user: UserId, capability: &str) {
    tracing::trace!(%user, capability, "access granted");
  }
}
