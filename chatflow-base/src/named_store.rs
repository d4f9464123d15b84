use std::collections::HashMap;
use std::sync::Arc;
use super::RegistryError;

/// A store of shared definitions looked up by a unique name.
///
/// Meant to be filled once at startup and only read afterwards, so lookups hand out [`Arc`]s
/// that can outlive any borrow of the store.
///
/// # Examples
/// ```
/// # use chatflow_base::{NamedStore, RegistryError};
/// let mut store = NamedStore::new();
/// store.register("greeting", "hello").unwrap();
///
/// assert_eq!(*store.get("greeting").unwrap(), "hello");
/// assert_eq!(store.register("greeting", "hi"), Err(RegistryError::NameAlreadyExists("greeting".to_owned())));
/// ```
#[derive(Debug)]
pub struct NamedStore<T> {
  by_name: HashMap<String, Arc<T>>,
  // registration order, so listings are stable
  names: Vec<String>,
}

impl<T> NamedStore<T> {
  /// Create a new NamedStore
  pub fn new() -> Self {
    Self::with_capacity(0)
  }

  /// Create a new NamedStore with initial capacity
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      by_name: HashMap::with_capacity(capacity),
      names: Vec::with_capacity(capacity),
    }
  }

  /// Register `object` under `name`. A name can only be registered once.
  pub fn register<STR>(&mut self, name: STR, object: T) -> Result<Arc<T>, RegistryError>
      where STR: Into<String>
  {
    let name = name.into();
    if self.by_name.contains_key(&name) {
      return Err(RegistryError::NameAlreadyExists(name));
    }
    let object = Arc::new(object);
    self.by_name.insert(name.clone(), object.clone());
    self.names.push(name);
    Ok(object)
  }

  /// Get an object by its name
  pub fn get(&self, name: &str) -> Option<Arc<T>> {
    self.by_name.get(name).cloned()
  }

  /// Same as [`get`](NamedStore::get) but missing names are an error
  pub fn lookup(&self, name: &str) -> Result<Arc<T>, RegistryError> {
    self.get(name).ok_or_else(|| RegistryError::NoSuchName(name.to_owned()))
  }

  pub fn contains(&self, name: &str) -> bool {
    self.by_name.contains_key(name)
  }

  pub fn len(&self) -> usize {
    self.names.len()
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }

  /// Iterate over registered names and objects in registration order
  pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<T>)> {
    let by_name = &self.by_name;
    self.names
      .iter()
      .filter_map(move |name| by_name.get(name).map(|object| (name.as_str(), object)))
  }
}

impl<T> Default for NamedStore<T> {
  fn default() -> Self {
    Self::new()
  }
}
