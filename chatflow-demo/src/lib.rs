//! A small bank bot built on [ChatFlow](chatflow).
//!
//! Users can look at profiles, rename themselves and send money to each other. Renaming and
//! transfers are multi-step flows; everything else is a plain command or button.

mod amount;
pub use amount::Amount;

pub mod users;
pub mod access;
pub mod replies;

mod services;
pub use services::AppServices;

pub mod flows;
pub mod bot;
pub mod console;

mod config;
pub use config::{DemoConfig, DemoError, CONFIG_ENV};

use std::sync::Arc;
use chatflow::{Dispatcher, EngineConfig, SessionStore};
use chatflow::prelude::ReplySink;
use users::UserStore;

/// Wire the bot together: flows, routes and services
pub fn app(users: Arc<dyn UserStore>, replies: Box<dyn ReplySink>, config: EngineConfig)
  -> Result<Dispatcher<AppServices>, DemoError>
{
  let services = Arc::new(AppServices::new(users, replies));
  let store = SessionStore::new(flows::registry()?, services, config);
  Ok(bot::dispatcher(store)?)
}

#[cfg(test)]
mod test;
