//! The bot's two flows: `change_name` and `transfer_balance`.

use tracing::warn;
use chatflow::{FlowContext, FlowError};
use chatflow::base::UserId;
use chatflow::data::{AllOf, ContextKey, DecimalValidator, MaxLength, MinLength};
use chatflow::flow::{Flow, FlowBuilder, FlowRegistry, Input, Step, StepOutcome};
use chatflow::port::{Button, Keyboard, TemplateParams};
use chatflow::prelude::Services;
use crate::access::{CHANGE_NAME, TRANSFER_BALANCE};
use crate::users::UserStoreError;
use crate::{Amount, AppServices};

pub const NEW_NAME: ContextKey<String> = ContextKey::new("new_name");
pub const AMOUNT: ContextKey<Amount> = ContextKey::new("amount");
pub const RECIPIENT: ContextKey<UserId> = ContextKey::new("recipient");

pub const CONFIRM: &str = "confirm";
pub const CANCEL: &str = "cancel";
pub const RECIPIENT_PREFIX: &str = "recipient:";
pub const CANCEL_COMMAND: &str = "/cancel";

const USE_BUTTONS: &str = "Please use the buttons below.";

type Ctx<'a> = FlowContext<'a, AppServices>;

pub fn registry() -> Result<FlowRegistry<AppServices>, FlowError> {
  let mut registry = FlowRegistry::new();
  registry.register(change_name()?)?;
  registry.register(transfer_balance()?)?;
  Ok(registry)
}

fn confirm_keyboard() -> Keyboard {
  Keyboard::new().row(vec![Button::callback("✅ Confirm", CONFIRM), Button::callback("❌ Cancel", CANCEL)])
}

fn cancel_button() -> Button {
  Button::callback("❌ Cancel", CANCEL)
}

fn balance_of(ctx: &Ctx<'_>, user: UserId) -> Amount {
  ctx.services().users().get(user).map(|record| record.balance).unwrap_or(Amount::ZERO)
}

fn name_of(ctx: &Ctx<'_>, user: UserId) -> String {
  ctx.services().users().get(user).map(|record| record.name).unwrap_or_else(|| user.to_string())
}

/// Input handling shared by the confirmation steps; `confirmed` runs on the confirm button
fn confirm_input<F>(ctx: &mut Ctx<'_>, input: Input<'_>, confirmed: F) -> StepOutcome
    where F: FnOnce(&mut Ctx<'_>) -> StepOutcome
{
  match input {
    Input::Callback(CONFIRM) => confirmed(ctx),
    Input::Callback(CANCEL) => StepOutcome::Cancel,
    Input::Callback(_) => StepOutcome::Stay,
    Input::Text(_) => StepOutcome::error(USE_BUTTONS),
  }
}


pub fn change_name() -> Result<Flow<AppServices>, FlowError> {
  FlowBuilder::new(CHANGE_NAME)
    .step(Step::new("new_name")
      .validator(AllOf::new()
        .with(MinLength::new(2, "Name must be at least 2 characters long"))
        .with(MaxLength::new(32, "Name must be at most 32 characters long")))
      .on_enter(enter_new_name)
      .on_input(new_name_input))
    .step(Step::new("confirm")
      .on_enter(enter_confirm_name)
      .on_input(confirm_name_input))
    .cancel_command(CANCEL_COMMAND)
    .on_complete(name_changed)
    .on_cancel(|ctx| ctx.reply("Name change cancelled."))
    .build()
}

fn enter_new_name(ctx: &mut Ctx<'_>) {
  ctx.reply_with("✏️ Enter your new name:", &Keyboard::new().row(vec![cancel_button()]));
}

fn new_name_input(ctx: &mut Ctx<'_>, input: Input<'_>) -> StepOutcome {
  match input {
    Input::Text(text) => {
      ctx.set(&NEW_NAME, text.trim().to_owned());
      StepOutcome::Continue
    }
    Input::Callback(CANCEL) => StepOutcome::Cancel,
    Input::Callback(_) => StepOutcome::Stay,
  }
}

fn enter_confirm_name(ctx: &mut Ctx<'_>) {
  let name = ctx.get(&NEW_NAME).cloned().unwrap_or_default();
  ctx.reply_with(&format!("Change your name to \"{}\"?", name), &confirm_keyboard());
}

fn confirm_name_input(ctx: &mut Ctx<'_>, input: Input<'_>) -> StepOutcome {
  confirm_input(ctx, input, |ctx| {
    let name = match ctx.get(&NEW_NAME).cloned() {
      Some(name) => name,
      None => return StepOutcome::Cancel,
    };
    match ctx.services().users().rename(ctx.user(), &name) {
      Ok(()) => StepOutcome::Continue,
      Err(err) => {
        warn!(user = %ctx.user(), error = %err, "rename failed");
        ctx.reply("Your account could not be found.");
        StepOutcome::Cancel
      }
    }
  })
}

fn name_changed(ctx: &mut Ctx<'_>) {
  let name = ctx.get(&NEW_NAME).cloned().unwrap_or_default();
  ctx.reply_template("name_changed", &TemplateParams::new().with("name", name), None);
}


pub fn transfer_balance() -> Result<Flow<AppServices>, FlowError> {
  FlowBuilder::new(TRANSFER_BALANCE)
    .step(Step::new("amount")
      .validator(DecimalValidator::new("Please enter a valid amount, e.g. 25.50")
        .max_decimal_places(2, "Amount must have at most 2 decimal places")
        .greater_than(0.0, "Amount must be greater than 0")
        .at_most(10_000.0, "Maximum transfer amount is $10,000"))
      .on_enter(enter_amount)
      .on_input(amount_input))
    .step(Step::new("recipient")
      .on_enter(enter_recipient)
      .on_input(recipient_input))
    .step(Step::new("confirm")
      .on_enter(enter_confirm_transfer)
      .on_input(confirm_transfer_input))
    .cancel_command(CANCEL_COMMAND)
    .on_complete(transfer_done)
    .on_cancel(|ctx| ctx.reply("Transfer cancelled."))
    .build()
}

fn insufficient(available: Amount) -> StepOutcome {
  StepOutcome::error(format!("Insufficient balance. You have ${}.", available))
}

fn enter_amount(ctx: &mut Ctx<'_>) {
  let balance = balance_of(ctx, ctx.user());
  ctx.reply_template(
    "transfer_prompt",
    &TemplateParams::new().with("balance", balance),
    Some(&Keyboard::new().row(vec![cancel_button()])));
}

fn amount_input(ctx: &mut Ctx<'_>, input: Input<'_>) -> StepOutcome {
  let text = match input {
    Input::Text(text) => text,
    Input::Callback(CANCEL) => return StepOutcome::Cancel,
    Input::Callback(_) => return StepOutcome::Stay,
  };
  let amount = match text.parse::<Amount>() {
    Ok(amount) => amount,
    Err(_) => return StepOutcome::error("Please enter a valid amount, e.g. 25.50"),
  };

  let balance = balance_of(ctx, ctx.user());
  if amount > balance {
    return insufficient(balance);
  }
  ctx.set(&AMOUNT, amount);
  StepOutcome::Continue
}

fn enter_recipient(ctx: &mut Ctx<'_>) {
  let me = ctx.user();
  let keyboard = Keyboard::column(ctx.services().users()
      .list()
      .into_iter()
      .filter(|record| record.id != me)
      .map(|record| Button::callback(record.name, format!("{}{}", RECIPIENT_PREFIX, record.id))))
    .row(vec![cancel_button()]);
  ctx.reply_with("Who should receive it? Pick a user or type their id:", &keyboard);
}

fn recipient_input(ctx: &mut Ctx<'_>, input: Input<'_>) -> StepOutcome {
  let raw = match input {
    Input::Callback(CANCEL) => return StepOutcome::Cancel,
    Input::Callback(data) => match data.strip_prefix(RECIPIENT_PREFIX) {
      Some(id) => id,
      None => return StepOutcome::Stay,
    },
    Input::Text(text) => text,
  };

  let recipient = match raw.parse::<UserId>() {
    Ok(recipient) => recipient,
    Err(_) => return StepOutcome::error("Please pick a recipient from the list or type their user id."),
  };
  if recipient == ctx.user() {
    return StepOutcome::error("You can't transfer money to yourself.");
  }
  if ctx.services().users().get(recipient).is_none() {
    return StepOutcome::error(format!("User {} not found.", recipient));
  }
  ctx.set(&RECIPIENT, recipient);
  StepOutcome::Continue
}

fn enter_confirm_transfer(ctx: &mut Ctx<'_>) {
  let amount = ctx.get(&AMOUNT).copied().unwrap_or_default();
  let recipient = ctx.get(&RECIPIENT).copied().map(|id| name_of(ctx, id)).unwrap_or_default();
  ctx.reply_template(
    "transfer_confirm",
    &TemplateParams::new().with("amount", amount).with("recipient", recipient),
    Some(&confirm_keyboard()));
}

fn confirm_transfer_input(ctx: &mut Ctx<'_>, input: Input<'_>) -> StepOutcome {
  confirm_input(ctx, input, |ctx| {
    let (amount, recipient) = match (ctx.get(&AMOUNT).copied(), ctx.get(&RECIPIENT).copied()) {
      (Some(amount), Some(recipient)) => (amount, recipient),
      _ => return StepOutcome::Cancel,
    };
    // balances may have moved since the amount was entered
    match ctx.services().users().transfer(ctx.user(), recipient, amount) {
      Ok(()) => StepOutcome::Continue,
      Err(UserStoreError::InsufficientBalance { available }) => insufficient(available),
      Err(UserStoreError::NoSuchUser(id)) => StepOutcome::error(format!("User {} not found.", id)),
      Err(err) => {
        warn!(user = %ctx.user(), error = %err, "transfer failed");
        StepOutcome::error("The transfer failed, please try again.")
      }
    }
  })
}

fn transfer_done(ctx: &mut Ctx<'_>) {
  let (amount, recipient) = match (ctx.get(&AMOUNT).copied(), ctx.get(&RECIPIENT).copied()) {
    (Some(amount), Some(recipient)) => (amount, recipient),
    _ => return,
  };
  let sender = ctx.user();
  let params = TemplateParams::new()
    .with("amount", amount)
    .with("recipient", name_of(ctx, recipient))
    .with("balance", balance_of(ctx, sender));
  ctx.reply_template("transfer_done", &params, None);

  let received = TemplateParams::new()
    .with("sender", name_of(ctx, sender))
    .with("amount", amount);
  if let Err(err) = ctx.services().replies().reply_template(recipient, "transfer_received", &received, None) {
    warn!(user = %recipient, error = %err, "could not notify recipient");
  }
}
