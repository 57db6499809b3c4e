//! Robot commands: grammar, legality, consequences and application.
//!
//! # Module Structure
//!
//! - `command`: parsed command types ([`Action`], [`Command`])
//! - `grammar`: the injectable [`CommandAlphabet`] (parse and format)
//! - `consequence`: consequence records emitted by the validator
//! - `validator`: legality checks and step bookkeeping
//! - `apply`: board mutations of a consequence list
//! - `error`: [`CommandError`] and [`IllegalReason`]

mod apply;
mod command;
mod consequence;
mod error;
mod grammar;
mod validator;

pub use apply::Applied;
pub use command::{Action, ActionKind, Command, GlobalCommand};
pub use consequence::Consequence;
pub use error::{CommandError, IllegalReason};
pub use grammar::CommandAlphabet;
pub use validator::{Analysis, Checked, CommandValidator, StepReport, check_action};
