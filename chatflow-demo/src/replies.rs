use std::io::Write;
use parking_lot::Mutex;
use chatflow::base::{RegistryError, UserId};
use chatflow::port::{Keyboard, ButtonAction, ReplyError, TemplateParams, TemplateSet};
use chatflow::prelude::ReplySink;

/// Templates the bot replies with. Params are HTML-escaped, the templates themselves are trusted.
pub fn templates() -> Result<TemplateSet, RegistryError> {
  let mut templates = TemplateSet::new();
  templates.register("welcome", "👋 Welcome, <b>{{name}}</b>! What would you like to do?")?;
  templates.register("help", concat!(
    "<b>Commands</b>\n",
    "/profile - show your profile\n",
    "/change_name - change your display name\n",
    "/transfer - send money to another user\n",
    "/users - list all users (admins only)\n",
    "/cancel - leave what you're doing"))?;
  templates.register("profile", "👤 <b>{{name}}</b> (#{{id}})\nRole: {{role}}\nBalance: ${{balance}}")?;
  templates.register("name_changed", "✅ Your name is now <b>{{name}}</b>.")?;
  templates.register("transfer_prompt", "💸 Your balance is ${{balance}}. How much would you like to send?")?;
  templates.register("transfer_confirm", "Send <b>${{amount}}</b> to <b>{{recipient}}</b>?")?;
  templates.register("transfer_done", "✅ Sent ${{amount}} to {{recipient}}. Your balance is now ${{balance}}.")?;
  templates.register("transfer_received", "💰 {{sender}} sent you ${{amount}}.")?;
  Ok(templates)
}

/// Text form of a keyboard, one row per line
pub fn render_keyboard(keyboard: &Keyboard) -> String {
  keyboard.rows()
    .iter()
    .map(|row| row
      .iter()
      .map(|button| match &button.action {
        ButtonAction::Callback(data) => format!("[{}](#{})", button.label, data),
        ButtonAction::Url(url) => format!("[{}]({})", button.label, url),
      })
      .collect::<Vec<_>>()
      .join(" "))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Writes replies as text, e.g. to stdout
pub struct ConsoleReplies {
  templates: TemplateSet,
  out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleReplies {
  pub fn new(templates: TemplateSet, out: Box<dyn Write + Send>) -> Self {
    ConsoleReplies { templates, out: Mutex::new(out) }
  }

  pub fn stdout(templates: TemplateSet) -> Self {
    Self::new(templates, Box::new(std::io::stdout()))
  }
}

impl ReplySink for ConsoleReplies {
  fn reply(&self, user: UserId, text: &str, keyboard: Option<&Keyboard>) -> Result<(), ReplyError> {
    let mut out = self.out.lock();
    let mut written = writeln!(out, "→ {}: {}", user, text);
    if let Some(keyboard) = keyboard.filter(|keyboard| !keyboard.is_empty()) {
      written = written.and_then(|_| writeln!(out, "{}", render_keyboard(keyboard)));
    }
    written
      .and_then(|_| out.flush())
      .map_err(|err| ReplyError::Transport(err.to_string()))
  }

  fn reply_template(&self, user: UserId, template: &str, params: &TemplateParams, keyboard: Option<&Keyboard>)
    -> Result<(), ReplyError>
  {
    let text = self.templates.render(template, params)?;
    self.reply(user, &text, keyboard)
  }
}
