//! 命令行：终端交互与子命令

pub mod commands;
pub mod terminal;

pub use commands::{run_add, run_batch};
pub use terminal::{parse_choice, Choice, TerminalPresenter};
