use chatflow_base::RegistryError;

#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize))]
pub enum ReplyError {
  // the transport could not deliver the message
  Transport(String),
  UnknownTemplate(String),
  Registry(RegistryError),
}

impl From<RegistryError> for ReplyError {
  fn from(err: RegistryError) -> Self {
    match err {
      RegistryError::NoSuchName(name) => ReplyError::UnknownTemplate(name),
      other => ReplyError::Registry(other),
    }
  }
}

impl std::error::Error for ReplyError {}

impl std::fmt::Display for ReplyError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:?}", self)
  }
}
