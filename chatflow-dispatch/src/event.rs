use chatflow_session::Input;

/// Something a user sent, as delivered by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
  /// A typed message, commands included
  Message(String),
  /// A button press with its callback data
  Callback(String),
}

impl Event {
  pub fn message<STR>(text: STR) -> Self
      where STR: Into<String>
  {
    Event::Message(text.into())
  }

  pub fn callback<STR>(data: STR) -> Self
      where STR: Into<String>
  {
    Event::Callback(data.into())
  }

  /// The event as a step sees it
  pub fn as_input(&self) -> Input<'_> {
    match self {
      Event::Message(text) => Input::Text(text),
      Event::Callback(data) => Input::Callback(data),
    }
  }

  pub fn command(&self) -> Option<Command<'_>> {
    match self {
      Event::Message(text) => Command::parse(text),
      Event::Callback(_) => None,
    }
  }
}

/// A `/command` message split into its name and arguments.
///
/// The name drops the leading `/` and any `@botname` suffix.
/// ```
/// # use chatflow_dispatch::Command;
/// let command = Command::parse("/transfer@bank_bot 100 to 2").unwrap();
/// assert_eq!(command.name, "transfer");
/// assert_eq!(command.args, "100 to 2");
///
/// assert!(Command::parse("hello").is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command<'e> {
  pub name: &'e str,
  pub args: &'e str,
}

impl<'e> Command<'e> {
  pub fn parse(text: &'e str) -> Option<Self> {
    let text = text.trim();
    let rest = text.strip_prefix('/')?;
    let (head, args) = match rest.find(char::is_whitespace) {
      Some(split) => (&rest[..split], rest[split..].trim_start()),
      None => (rest, ""),
    };
    let name = match head.find('@') {
      Some(at) => &head[..at],
      None => head,
    };
    if name.is_empty() {
      return None;
    }
    Some(Command { name, args })
  }
}
