use std::collections::HashMap;
use parking_lot::RwLock;
use tracing::{event, Level};
use chatflow::base::UserId;
use crate::Amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  Admin,
  User,
  Guest,
}

impl std::fmt::Display for Role {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:?}", self)
  }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UserRecord {
  pub id: UserId,
  pub name: String,
  pub role: Role,
  pub balance: Amount,
}

impl UserRecord {
  pub fn new<STR>(id: UserId, name: STR, role: Role, balance: Amount) -> Self
      where STR: Into<String>
  {
    UserRecord { id, name: name.into(), role, balance }
  }
}

#[derive(Debug, PartialEq, Clone)]
pub enum UserStoreError {
  NoSuchUser(UserId),
  SameUser,
  InvalidAmount(Amount),
  InsufficientBalance { available: Amount },
}

impl std::error::Error for UserStoreError {}

impl std::fmt::Display for UserStoreError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:?}", self)
  }
}

/// The bot's user records
pub trait UserStore: Send + Sync {
  fn get(&self, id: UserId) -> Option<UserRecord>;
  /// All users, ordered by id
  fn list(&self) -> Vec<UserRecord>;
  fn rename(&self, id: UserId, name: &str) -> Result<(), UserStoreError>;
  /// Move `amount` from one balance to another, all or nothing
  fn transfer(&self, from: UserId, to: UserId, amount: Amount) -> Result<(), UserStoreError>;
}


#[derive(Debug, Default)]
pub struct MemoryUserStore {
  users: RwLock<HashMap<UserId, UserRecord>>,
}

impl MemoryUserStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_users<I>(users: I) -> Self
      where I: IntoIterator<Item = UserRecord>
  {
    MemoryUserStore {
      users: RwLock::new(users.into_iter().map(|user| (user.id, user)).collect()),
    }
  }

  /// A few users to play with from the console
  pub fn seeded() -> Self {
    Self::with_users(vec![
      UserRecord::new(UserId::new(1), "Alice", Role::Admin, Amount::from_cents(100_000)),
      UserRecord::new(UserId::new(2), "Bob", Role::User, Amount::from_cents(15_050)),
      UserRecord::new(UserId::new(3), "Carol", Role::User, Amount::from_cents(7_525)),
      UserRecord::new(UserId::new(4), "Dave", Role::Guest, Amount::ZERO),
    ])
  }

  pub fn insert(&self, user: UserRecord) {
    self.users.write().insert(user.id, user);
  }
}

impl UserStore for MemoryUserStore {
  fn get(&self, id: UserId) -> Option<UserRecord> {
    self.users.read().get(&id).cloned()
  }

  fn list(&self) -> Vec<UserRecord> {
    let mut users = self.users.read().values().cloned().collect::<Vec<_>>();
    users.sort_by_key(|user| user.id);
    users
  }

  fn rename(&self, id: UserId, name: &str) -> Result<(), UserStoreError> {
    let mut users = self.users.write();
    let user = users.get_mut(&id).ok_or(UserStoreError::NoSuchUser(id))?;
    user.name = name.to_owned();
    Ok(())
  }

  fn transfer(&self, from: UserId, to: UserId, amount: Amount) -> Result<(), UserStoreError> {
    if from == to {
      return Err(UserStoreError::SameUser);
    }
    if !amount.is_positive() {
      return Err(UserStoreError::InvalidAmount(amount));
    }

    // one write lock for both balances
    let mut users = self.users.write();
    let available = users.get(&from).ok_or(UserStoreError::NoSuchUser(from))?.balance;
    let receiver = users.get(&to).ok_or(UserStoreError::NoSuchUser(to))?.balance;

    if available < amount {
      return Err(UserStoreError::InsufficientBalance { available });
    }
    let sender_after = available.checked_sub(amount).ok_or(UserStoreError::InvalidAmount(amount))?;
    let receiver_after = receiver.checked_add(amount).ok_or(UserStoreError::InvalidAmount(amount))?;

    if let Some(sender) = users.get_mut(&from) {
      sender.balance = sender_after;
    }
    if let Some(receiver) = users.get_mut(&to) {
      receiver.balance = receiver_after;
    }
    event!(Level::INFO, %from, %to, %amount, "balance transferred");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use chatflow::base::UserId;
  use chatflow_test_util::test_id;
  use crate::Amount;
  use super::{MemoryUserStore, Role, UserRecord, UserStore, UserStoreError};

  fn two_users() -> (MemoryUserStore, UserId, UserId) {
    let (sender, receiver) = (test_id!(UserId), test_id!(UserId));
    let store = MemoryUserStore::with_users(vec![
      UserRecord::new(sender, "Sender", Role::User, "150.50".parse().unwrap()),
      UserRecord::new(receiver, "Receiver", Role::User, "75.25".parse().unwrap()),
    ]);
    (store, sender, receiver)
  }

  fn total(store: &MemoryUserStore) -> Amount {
    store.list().iter().fold(Amount::ZERO, |sum, user| sum.checked_add(user.balance).unwrap())
  }

  #[test]
  fn transfer_conserves_balance() {
    let (store, sender, receiver) = two_users();
    assert_eq!(total(&store), Amount::from_cents(22_575));

    store.transfer(sender, receiver, "100.00".parse().unwrap()).unwrap();
    assert_eq!(store.get(sender).unwrap().balance, Amount::from_cents(5_050));
    assert_eq!(store.get(receiver).unwrap().balance, Amount::from_cents(17_525));
    assert_eq!(total(&store), Amount::from_cents(22_575));
  }

  #[test]
  fn transfer_errors_leave_balances() {
    let (store, sender, receiver) = two_users();
    let stranger = test_id!(UserId);

    assert_eq!(
      store.transfer(sender, receiver, Amount::from_cents(15_051)),
      Err(UserStoreError::InsufficientBalance { available: Amount::from_cents(15_050) }));
    assert_eq!(store.transfer(sender, sender, Amount::from_cents(1)), Err(UserStoreError::SameUser));
    assert_eq!(store.transfer(sender, stranger, Amount::from_cents(1)), Err(UserStoreError::NoSuchUser(stranger)));
    assert_eq!(store.transfer(sender, receiver, Amount::ZERO), Err(UserStoreError::InvalidAmount(Amount::ZERO)));

    assert_eq!(store.get(sender).unwrap().balance, Amount::from_cents(15_050));
    assert_eq!(store.get(receiver).unwrap().balance, Amount::from_cents(7_525));
  }

  #[test]
  fn rename() {
    let (store, sender, _) = two_users();
    store.rename(sender, "Al").unwrap();
    assert_eq!(store.get(sender).unwrap().name, "Al");

    let stranger = test_id!(UserId);
    assert_eq!(store.rename(stranger, "Nobody"), Err(UserStoreError::NoSuchUser(stranger)));
  }

  #[test]
  fn list_is_ordered() {
    let store = MemoryUserStore::seeded();
    let ids = store.list().iter().map(|user| user.id.val()).collect::<Vec<_>>();
    assert_eq!(ids, vec![1, 2, 3, 4]);
  }
}
