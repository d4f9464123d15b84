use chatflow_base::UserId;
use crate::{Keyboard, ReplyError, TemplateParams};

/// Where replies to users go.
///
/// Sending is fire-and-forget from the engine's point of view: a failed send is logged by whoever
/// asked for it and never retried.
pub trait ReplySink: Send + Sync {
  fn reply(&self, user: UserId, text: &str, keyboard: Option<&Keyboard>) -> Result<(), ReplyError>;

  /// Render the named template with `params` and send the result
  fn reply_template(&self, user: UserId, template: &str, params: &TemplateParams, keyboard: Option<&Keyboard>)
    -> Result<(), ReplyError>;
}
