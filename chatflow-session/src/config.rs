use std::time::Duration;

/// What happens when a flow is started for a user who is already in one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize), serde(rename_all = "snake_case"))]
pub enum StartPolicy {
  /// Cancel the active flow (firing its `on_cancel`) and start the new one
  Replace,
  /// Refuse with [`FlowError::AlreadyInFlow`](crate::FlowError::AlreadyInFlow)
  Reject,
}

impl Default for StartPolicy {
  fn default() -> Self {
    StartPolicy::Replace
  }
}

/// Engine settings.
///
/// With the `serde-support` feature this deserializes from e.g. JSON, and missing fields take their
/// default:
/// ```json
/// { "start_policy": "reject", "idle_timeout_secs": 900 }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct EngineConfig {
  pub start_policy: StartPolicy,

  /// Active sessions idle this long are cancelled by [`SessionStore::expire_idle`](crate::SessionStore::expire_idle).
  /// `None` disables expiry.
  pub idle_timeout_secs: Option<u64>,

  /// Reply sent when a gated handler is refused
  pub permission_denied_text: String,

  /// Prepended to a validator's rejection message
  pub invalid_input_prefix: Option<String>,
}

impl EngineConfig {
  pub fn idle_timeout(&self) -> Option<Duration> {
    self.idle_timeout_secs.map(Duration::from_secs)
  }

  pub(crate) fn rejection_text(&self, message: &str) -> String {
    match &self.invalid_input_prefix {
      Some(prefix) => format!("{}{}", prefix, message),
      None => message.to_owned(),
    }
  }
}

impl Default for EngineConfig {
  fn default() -> Self {
    EngineConfig {
      start_policy: StartPolicy::Replace,
      idle_timeout_secs: None,
      permission_denied_text: "⛔ You don't have permission to perform this action.".to_owned(),
      invalid_input_prefix: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;
  use super::{EngineConfig, StartPolicy};

  #[test]
  fn defaults() {
    let config = EngineConfig::default();
    assert_eq!(config.start_policy, StartPolicy::Replace);
    assert_eq!(config.idle_timeout(), None);
    assert_eq!(config.rejection_text("nope"), "nope");
  }

  #[test]
  fn rejection_prefix() {
    let config = EngineConfig { invalid_input_prefix: Some("❌ ".to_owned()), ..Default::default() };
    assert_eq!(config.rejection_text("Too short"), "❌ Too short");
  }

  #[test]
  fn idle_timeout() {
    let config = EngineConfig { idle_timeout_secs: Some(90), ..Default::default() };
    assert_eq!(config.idle_timeout(), Some(Duration::from_secs(90)));
  }

  #[cfg(feature = "serde-support")]
  #[test]
  fn from_json() {
    let config: EngineConfig = serde_json::from_str(r#"{ "start_policy": "reject", "idle_timeout_secs": 900 }"#).unwrap();
    assert_eq!(config.start_policy, StartPolicy::Reject);
    assert_eq!(config.idle_timeout_secs, Some(900));
    assert_eq!(config.permission_denied_text, EngineConfig::default().permission_denied_text);
  }
}
