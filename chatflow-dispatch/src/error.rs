use crate::RouteKind;

#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize))]
pub enum DispatchError {
  DuplicateRoute { kind: RouteKind, trigger: String },
  EmptyTrigger(RouteKind),
}

impl std::error::Error for DispatchError {}

impl std::fmt::Display for DispatchError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:?}", self)
  }
}
