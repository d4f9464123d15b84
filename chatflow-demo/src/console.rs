//! Line based transport for trying the bot in a terminal.
//!
//! Each input line is `<user id> <message>` or `<user id> #<callback data>`, e.g.
//! ```text
//! 2 /transfer
//! 2 250.00
//! 2 #recipient:3
//! 2 #confirm
//! ```

use std::io::BufRead;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use chatflow::{Dispatcher, Event};
use chatflow::base::UserId;
use crate::AppServices;

pub fn parse_line(line: &str) -> Option<(UserId, Event)> {
  let (id, rest) = line.trim().split_once(char::is_whitespace)?;
  let user = id.parse::<UserId>().ok()?;
  let rest = rest.trim();
  if rest.is_empty() {
    return None;
  }
  let event = match rest.strip_prefix('#') {
    Some(data) => Event::callback(data),
    None => Event::message(rest),
  };
  Some((user, event))
}

/// Feed every line of `input` to `dispatcher` until it runs out.
///
/// With `sweep` set, idle sessions are expired at most that often, checked between lines.
pub fn run<R>(dispatcher: &Dispatcher<AppServices>, input: R, sweep: Option<Duration>) -> std::io::Result<()>
    where R: BufRead
{
  let mut last_sweep = Instant::now();
  for line in input.lines() {
    let line = line?;
    if line.trim().is_empty() {
      continue;
    }
    match parse_line(&line) {
      Some((user, event)) => {
        let outcome = dispatcher.handle_event(user, &event);
        debug!(%user, ?outcome);
      }
      None => warn!(line = %line, "expected `<user id> <text>` or `<user id> #<callback>`"),
    }

    if let Some(sweep) = sweep {
      if last_sweep.elapsed() >= sweep {
        let expired = dispatcher.expire_idle(Instant::now());
        if !expired.is_empty() {
          info!(count = expired.len(), "expired idle sessions");
        }
        last_sweep = Instant::now();
      }
    }
  }
  Ok(())
}
