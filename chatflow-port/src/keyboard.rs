/// What pressing a [`Button`] does
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum ButtonAction {
  /// Sends the data back to the bot as a callback event
  Callback(String),
  /// Opens a link; the bot never hears about it
  Url(String),
}

#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Button {
  pub label: String,
  pub action: ButtonAction,
}

impl Button {
  pub fn callback<L, D>(label: L, data: D) -> Self
      where L: Into<String>, D: Into<String>
  {
    Button { label: label.into(), action: ButtonAction::Callback(data.into()) }
  }

  pub fn url<L, U>(label: L, url: U) -> Self
      where L: Into<String>, U: Into<String>
  {
    Button { label: label.into(), action: ButtonAction::Url(url.into()) }
  }

  pub fn callback_data(&self) -> Option<&str> {
    match &self.action {
      ButtonAction::Callback(data) => Some(data.as_str()),
      ButtonAction::Url(_) => None,
    }
  }
}


/// Inline keyboard attached to a reply, laid out in rows
///
/// ```
/// # use chatflow_port::{Keyboard, Button};
/// let keyboard = Keyboard::new()
///   .row(vec![Button::callback("✅ Confirm", "confirm"), Button::callback("❌ Cancel", "cancel")]);
/// assert_eq!(keyboard.callback_data().collect::<Vec<_>>(), vec!["confirm", "cancel"]);
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyboard {
  rows: Vec<Vec<Button>>,
}

impl Keyboard {
  pub fn new() -> Self {
    Keyboard { rows: Vec::new() }
  }

  /// One button per row
  pub fn column<I>(buttons: I) -> Self
      where I: IntoIterator<Item = Button>
  {
    Keyboard { rows: buttons.into_iter().map(|button| vec![button]).collect() }
  }

  /// Append a row. Empty rows are dropped.
  pub fn row(mut self, buttons: Vec<Button>) -> Self {
    if !buttons.is_empty() {
      self.rows.push(buttons);
    }
    self
  }

  pub fn rows(&self) -> &[Vec<Button>] {
    &self.rows
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  pub fn buttons(&self) -> impl Iterator<Item = &Button> {
    self.rows.iter().flatten()
  }

  pub fn callback_data(&self) -> impl Iterator<Item = &str> {
    self.buttons().filter_map(Button::callback_data)
  }
}
