// include commonly used traits
pub mod prelude {
  pub use chatflow_data::{Validator, ContextValue};
  pub use chatflow_port::{ReplySink, AccessManager, Services, EscapedString};
}

pub mod base {
  pub use chatflow_base::{UserId, NamedStore, RegistryError};
}

pub mod data {
  pub use chatflow_data::{ContextData, ContextKey};
  pub use chatflow_data::{InvalidValue, Rejection};
  pub use chatflow_data::validator::{FnValidator, AllOf, NotEmpty, MinLength, MaxLength, Pattern, DecimalValidator};
}

pub mod port {
  pub use chatflow_port::{Keyboard, Button, ButtonAction};
  pub use chatflow_port::{render_template, HtmlEscapedString, TemplateParams, TemplateSet};
  pub use chatflow_port::{AllowAll, ReplyError};
}

pub mod flow {
  pub use chatflow_session::{Step, StepOutcome, Input, Hook, InputHook};
  pub use chatflow_session::{Flow, FlowBuilder, FlowRegistry};
}

pub use chatflow_session::{Session, SessionStatus, SessionStore, FlowContext, StepTransition};
pub use chatflow_session::{EngineConfig, StartPolicy, FlowError};
pub use chatflow_dispatch::{Dispatcher, DispatcherBuilder, Event, Command, EventOutcome};
pub use chatflow_dispatch::{Route, RouteKind, Gate, Handler, DispatchError};
