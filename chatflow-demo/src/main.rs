use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use chatflow_demo::{app, console, DemoConfig};
use chatflow_demo::replies::{templates, ConsoleReplies};
use chatflow_demo::users::MemoryUserStore;

const DEFAULT_SWEEP_SECS: u64 = 30;

fn main() -> Result<(), Box<dyn std::error::Error>> {
  // stdout carries the bot's replies
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let config = DemoConfig::load()?;
  let users = if config.users.is_empty() {
    MemoryUserStore::seeded()
  } else {
    MemoryUserStore::with_users(config.users.clone())
  };

  let replies = ConsoleReplies::stdout(templates()?);
  let dispatcher = app(Arc::new(users), Box::new(replies), config.engine.clone())?;
  let sweep = config.engine
    .idle_timeout()
    .map(|_| Duration::from_secs(config.sweep_interval_secs.unwrap_or(DEFAULT_SWEEP_SECS)));

  info!(start_policy = ?config.engine.start_policy, idle_timeout = ?config.engine.idle_timeout(), "bot ready, reading stdin");
  let stdin = std::io::stdin();
  console::run(&dispatcher, stdin.lock(), sweep)?;
  info!("stdin closed, bye");
  Ok(())
}
