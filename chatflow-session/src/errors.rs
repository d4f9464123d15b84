use chatflow_base::RegistryError;

#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize))]
pub enum FlowError {
  // definition errors, expected at startup only
  DuplicateFlow(String),
  EmptyFlow(String),
  DuplicateStep { flow: String, step: String },

  // runtime errors
  UnknownFlow(String),
  AlreadyInFlow(String),
  NoActiveFlow,
  StepOutOfRange { flow: String, index: usize },
}

impl From<RegistryError> for FlowError {
  fn from(err: RegistryError) -> Self {
    match err {
      RegistryError::NameAlreadyExists(name) => FlowError::DuplicateFlow(name),
      RegistryError::NoSuchName(name) => FlowError::UnknownFlow(name),
    }
  }
}

impl std::error::Error for FlowError {}

impl std::fmt::Display for FlowError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:?}", self)
  }
}
