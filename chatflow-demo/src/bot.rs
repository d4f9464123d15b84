use tracing::warn;
use chatflow::{Dispatcher, DispatcherBuilder, DispatchError, FlowContext, Gate, SessionStore};
use chatflow::base::UserId;
use chatflow::port::{Button, Keyboard, TemplateParams};
use crate::access::{CHANGE_NAME, LIST_USERS, TRANSFER_BALANCE, VIEW_PROFILE};
use crate::users::UserRecord;
use crate::AppServices;

pub const START_FLOW_PREFIX: &str = "start_flow:";
pub const PROFILE_PREFIX: &str = "profile:";

type Ctx<'a> = FlowContext<'a, AppServices>;

/// All of the bot's commands, text triggers and buttons
pub fn dispatcher(store: SessionStore<AppServices>) -> Result<Dispatcher<AppServices>, DispatchError> {
  DispatcherBuilder::<AppServices>::new()
    .command("start", start)
    .command("help", |ctx, _args| ctx.reply_template("help", &TemplateParams::new(), None))
    .gated_command("profile", VIEW_PROFILE, profile)
    .gated_command("users", LIST_USERS, list_users)
    .gated_command(CHANGE_NAME, CHANGE_NAME, |ctx, _args| start_flow(ctx, CHANGE_NAME))
    .gated_command("transfer", TRANSFER_BALANCE, |ctx, _args| start_flow(ctx, TRANSFER_BALANCE))
    .gated_text("Change name", CHANGE_NAME, |ctx, _text| start_flow(ctx, CHANGE_NAME))
    .gated_text("Transfer", TRANSFER_BALANCE, |ctx, _text| start_flow(ctx, TRANSFER_BALANCE))
    .gated_callback_prefix(START_FLOW_PREFIX, Gate::Argument, start_flow)
    .gated_callback_prefix(PROFILE_PREFIX, Gate::Capability(VIEW_PROFILE.to_owned()), profile)
    .build(store)
}

fn main_menu() -> Keyboard {
  Keyboard::new()
    .row(vec![
      Button::callback("✏️ Change name", format!("{}{}", START_FLOW_PREFIX, CHANGE_NAME)),
      Button::callback("💸 Transfer", format!("{}{}", START_FLOW_PREFIX, TRANSFER_BALANCE)),
    ])
    .row(vec![Button::callback("👤 Profile", PROFILE_PREFIX)])
}

fn start(ctx: &mut Ctx<'_>, _args: &str) {
  let name = ctx.services().users().get(ctx.user()).map(|record| record.name).unwrap_or_else(|| "stranger".to_owned());
  ctx.reply_template("welcome", &TemplateParams::new().with("name", name), Some(&main_menu()));
}

fn start_flow(ctx: &mut Ctx<'_>, flow: &str) {
  if let Err(err) = ctx.start_flow(flow) {
    warn!(user = %ctx.user(), flow, error = %err, "could not start flow");
    ctx.reply("Sorry, that isn't available right now.");
  }
}

fn profile_params(record: &UserRecord) -> TemplateParams {
  TemplateParams::new()
    .with("name", &record.name)
    .with("id", record.id)
    .with("role", record.role)
    .with("balance", record.balance)
}

/// `/profile [id]` or the profile button; without an id, the user's own profile
fn profile(ctx: &mut Ctx<'_>, args: &str) {
  let id = match args.trim() {
    "" => ctx.user(),
    raw => match raw.parse::<UserId>() {
      Ok(id) => id,
      Err(_) => {
        ctx.reply("Usage: /profile [user id]");
        return;
      }
    },
  };
  match ctx.services().users().get(id) {
    Some(record) => ctx.reply_template("profile", &profile_params(&record), None),
    None => ctx.reply(&format!("User {} not found.", id)),
  }
}

fn list_users(ctx: &mut Ctx<'_>, _args: &str) {
  let lines = ctx.services().users()
    .list()
    .iter()
    .map(|record| format!("#{} {} ({}) ${}", record.id, record.name, record.role, record.balance))
    .collect::<Vec<_>>();
  ctx.reply(&format!("👥 Users\n{}", lines.join("\n")));
}
