//! Per-session scratch space.
//!
//! Values are addressed through a [`ContextKey`] that fixes the value type at the definition site,
//! so reading a value back never needs a fallible cast in caller code:
//!
//! ```
//! # use chatflow_data::{ContextData, ContextKey};
//! const NEW_NAME: ContextKey<String> = ContextKey::new("new_name");
//! const ATTEMPTS: ContextKey<u32> = ContextKey::new("attempts");
//!
//! let mut data = ContextData::new();
//! data.set(&NEW_NAME, "Alice".to_owned());
//! data.set(&ATTEMPTS, 1);
//!
//! assert_eq!(data.get(&NEW_NAME).map(String::as_str), Some("Alice"));
//! assert_eq!(data.get(&ATTEMPTS), Some(&1));
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt::Debug;
use std::marker::PhantomData;

/// Anything that can live in a [`ContextData`]
///
/// Implemented for every `Clone + Debug + Send + Sync` type, so callers never implement it themselves.
pub trait ContextValue: Debug + Send + Sync {
  fn as_any(&self) -> &dyn Any;
  fn into_any(self: Box<Self>) -> Box<dyn Any>;
  fn clone_box(&self) -> Box<dyn ContextValue>;
}

impl<T> ContextValue for T
    where T: Any + Debug + Clone + Send + Sync
{
  fn as_any(&self) -> &dyn Any {
    self
  }
  fn into_any(self: Box<Self>) -> Box<dyn Any> {
    self
  }
  fn clone_box(&self) -> Box<dyn ContextValue> {
    Box::new(self.clone())
  }
}

// NOTE: Box<dyn ContextValue> gets the blanket impl too, so always go through the inner value
// (i.e. `(**boxed).as_any()`), otherwise we'd be asking about the Box and not what it holds.
impl Clone for Box<dyn ContextValue> {
  fn clone(&self) -> Box<dyn ContextValue> {
    (**self).clone_box()
  }
}


/// A typed name for a value in [`ContextData`]
pub struct ContextKey<T> {
  name: &'static str,
  value_type: PhantomData<fn() -> T>,
}

impl<T> ContextKey<T> {
  pub const fn new(name: &'static str) -> Self {
    ContextKey { name, value_type: PhantomData }
  }

  pub fn name(&self) -> &'static str {
    self.name
  }
}

impl<T> Clone for ContextKey<T> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<T> Copy for ContextKey<T> {}

impl<T> Debug for ContextKey<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "ContextKey({})", self.name)
  }
}


/// Key-value data gathered while a flow runs.
///
/// Later writes to a key overwrite earlier ones, even with a value of another type.
/// A read through a key whose type does not match the stored value finds nothing.
#[derive(Debug, Clone, Default)]
pub struct ContextData {
  data: HashMap<&'static str, Box<dyn ContextValue>>,
}

impl ContextData {
  /// Create a new, empty ContextData
  pub fn new() -> Self {
    Self {
      data: HashMap::new()
    }
  }

  /// Store `value` under `key`, replacing whatever was there
  pub fn set<T>(&mut self, key: &ContextKey<T>, value: T)
      where T: ContextValue + 'static
  {
    self.data.insert(key.name, Box::new(value));
  }

  pub fn get<T>(&self, key: &ContextKey<T>) -> Option<&T>
      where T: 'static
  {
    self.data
      .get(key.name)
      .and_then(|boxed| (**boxed).as_any().downcast_ref::<T>())
  }

  /// Take the value out of the store. A value of another type is left in place.
  pub fn remove<T>(&mut self, key: &ContextKey<T>) -> Option<T>
      where T: 'static
  {
    self.get(key)?;
    let boxed = self.data.remove(key.name)?;
    boxed.into_any().downcast::<T>().ok().map(|val| *val)
  }

  pub fn contains<T>(&self, key: &ContextKey<T>) -> bool
      where T: 'static
  {
    self.get(key).is_some()
  }

  /// Whether any value is stored under `name`, regardless of its type
  pub fn contains_name(&self, name: &str) -> bool {
    self.data.contains_key(name)
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  pub fn clear(&mut self) {
    self.data.clear();
  }

  pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.data.keys().copied()
  }
}


#[cfg(test)]
mod tests {
  use super::{ContextData, ContextKey};

  const NAME: ContextKey<String> = ContextKey::new("name");
  const COUNT: ContextKey<u32> = ContextKey::new("count");
  const COUNT_AS_STRING: ContextKey<String> = ContextKey::new("count");

  #[derive(Debug, Clone, PartialEq)]
  struct Transfer {
    cents: i64,
  }
  const TRANSFER: ContextKey<Transfer> = ContextKey::new("transfer");

  #[test]
  fn set_get() {
    let mut data = ContextData::new();
    assert!(data.is_empty());

    data.set(&NAME, "bob".to_owned());
    data.set(&TRANSFER, Transfer { cents: 250 });
    assert_eq!(data.get(&NAME), Some(&"bob".to_owned()));
    assert_eq!(data.get(&TRANSFER), Some(&Transfer { cents: 250 }));
    assert_eq!(data.get(&COUNT), None);
    assert_eq!(data.len(), 2);
  }

  #[test]
  fn later_write_overwrites() {
    let mut data = ContextData::new();
    data.set(&COUNT, 1);
    data.set(&COUNT, 2);
    assert_eq!(data.get(&COUNT), Some(&2));
    assert_eq!(data.len(), 1);
  }

  #[test]
  fn type_mismatch_reads_as_absent() {
    let mut data = ContextData::new();
    data.set(&COUNT, 7);
    assert_eq!(data.get(&COUNT_AS_STRING), None);
    assert!(!data.contains(&COUNT_AS_STRING));
    assert!(data.contains_name("count"));

    // mismatched remove leaves the value alone
    assert_eq!(data.remove(&COUNT_AS_STRING), None);
    assert_eq!(data.get(&COUNT), Some(&7));

    // overwriting with another type through the same name replaces it
    data.set(&COUNT_AS_STRING, "seven".to_owned());
    assert_eq!(data.get(&COUNT), None);
    assert_eq!(data.get(&COUNT_AS_STRING).map(String::as_str), Some("seven"));
  }

  #[test]
  fn remove_and_clear() {
    let mut data = ContextData::new();
    data.set(&NAME, "al".to_owned());
    data.set(&COUNT, 3);
    assert_eq!(data.remove(&NAME), Some("al".to_owned()));
    assert!(!data.contains(&NAME));

    data.clear();
    assert!(data.is_empty());
    assert_eq!(data.names().count(), 0);
  }

  #[test]
  fn clone_is_deep() {
    let mut data = ContextData::new();
    data.set(&TRANSFER, Transfer { cents: 100 });
    let copy = data.clone();
    data.set(&TRANSFER, Transfer { cents: 5 });
    assert_eq!(copy.get(&TRANSFER), Some(&Transfer { cents: 100 }));
  }
}
