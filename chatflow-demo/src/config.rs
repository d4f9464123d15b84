use std::path::Path;
use chatflow::{DispatchError, EngineConfig, FlowError};
use chatflow::base::RegistryError;
use crate::users::UserRecord;

/// Names a JSON file with a [`DemoConfig`]
pub const CONFIG_ENV: &str = "CHATFLOW_CONFIG";

#[derive(Debug, PartialEq, Clone)]
pub enum DemoError {
  Config(String),
  Templates(RegistryError),
  Flow(FlowError),
  Dispatch(DispatchError),
}

impl std::error::Error for DemoError {}

impl std::fmt::Display for DemoError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:?}", self)
  }
}

impl From<RegistryError> for DemoError {
  fn from(err: RegistryError) -> Self {
    DemoError::Templates(err)
  }
}

impl From<FlowError> for DemoError {
  fn from(err: FlowError) -> Self {
    DemoError::Flow(err)
  }
}

impl From<DispatchError> for DemoError {
  fn from(err: DispatchError) -> Self {
    DemoError::Dispatch(err)
  }
}


/// Settings for the console bot. Every field is optional.
///
/// ```json
/// {
///   "engine": { "start_policy": "replace", "idle_timeout_secs": 300 },
///   "sweep_interval_secs": 30,
///   "users": [{ "id": 1, "name": "Alice", "role": "admin", "balance": 100000 }]
/// }
/// ```
/// Balances are in cents. Without `users` the store is seeded with a few sample users.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct DemoConfig {
  pub engine: EngineConfig,
  /// How often idle sessions are expired, when the engine has an idle timeout
  pub sweep_interval_secs: Option<u64>,
  pub users: Vec<UserRecord>,
}

impl DemoConfig {
  pub fn from_json(json: &str) -> Result<Self, DemoError> {
    serde_json::from_str(json).map_err(|err| DemoError::Config(err.to_string()))
  }

  pub fn from_file<P>(path: P) -> Result<Self, DemoError>
      where P: AsRef<Path>
  {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
      .map_err(|err| DemoError::Config(format!("{}: {}", path.display(), err)))?;
    Self::from_json(&json)
  }

  /// From the file named by [`CONFIG_ENV`], or the defaults when it isn't set
  pub fn load() -> Result<Self, DemoError> {
    match std::env::var_os(CONFIG_ENV) {
      Some(path) => Self::from_file(path),
      None => Ok(Self::default()),
    }
  }
}
