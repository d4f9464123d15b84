use crate::{AccessManager, ReplySink};

/// The capability set handed to every hook and handler.
///
/// Applications implement this on their own services struct and add whatever else their handlers
/// need (record stores, clients) as plain fields, reachable through
/// `FlowContext::services()`.
pub trait Services: Send + Sync + 'static {
  fn replies(&self) -> &dyn ReplySink;
  fn access(&self) -> &dyn AccessManager;
}
