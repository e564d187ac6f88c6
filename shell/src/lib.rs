//! A small interactive shell with pipelines.
//!
//! A line is split on `|` into stages and each stage on whitespace into
//! arguments. A single stage is either one of the built-ins (`help`, `cd`,
//! `sleep`) or an external program run with the shell's own streams; two or
//! more stages are spawned side by side, each adjacent pair joined by an OS
//! pipe, and every child is reaped before the next prompt.
//!
//! The main entry point is [`Interpreter`]. The [`external`] and [`pipeline`]
//! modules expose the executors directly for callers that want to supply their
//! own streams.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
pub mod external;
mod interpreter;
pub mod io_adapters;
pub mod lexer;
pub mod parser;
pub mod pipeline;

pub use builtin::{HELP_TEXT, parse_seconds};
pub use config::ShellConfig;
pub use error::ShellError;
pub use interpreter::{Dispatched, Interpreter, is_exit};
