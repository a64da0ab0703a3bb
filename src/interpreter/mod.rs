/// Command interpreter
///
/// Turns delimited command lines into typed commands and runs them against
/// a per-session register and variable environment.

pub mod command;
pub mod notice;
pub mod session;

pub use command::{Command, COMMAND_NAMES};
pub use notice::Notice;
pub use session::{Flow, Session, DEFAULT_DELIMITER};
