//! Ports for [ChatFlow](crate)
//!
//! The engine talks to the outside world only through these traits:
//! - [`ReplySink`] sends text (optionally with a [`Keyboard`]) back to a user
//! - [`AccessManager`] answers capability checks and records audited access
//! - [`Services`] bundles them with whatever else an application's handlers need
//!
//! [`TemplateSet`] renders named reply templates for sinks that want them.

mod error;
pub use error::ReplyError;

mod keyboard;
pub use keyboard::{Keyboard, Button, ButtonAction};

mod template;
pub use template::{render_template, EscapedString, HtmlEscapedString, TemplateParams, TemplateSet};

mod reply;
pub use reply::ReplySink;

mod access;
pub use access::{AccessManager, AllowAll};

mod services;
pub use services::Services;
