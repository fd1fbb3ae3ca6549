//! A small interactive command interpreter.
//!
//! The crate reads a line at a time, splits it into an argument vector while
//! honoring single and double quotes, and then either runs a built-in
//! command in-process or launches exactly one foreground child process and
//! waits for it. Every recoverable failure is reported on the diagnostic
//! channel and the session carries on.
//!
//! The main entry point is [`Interpreter`], which drives the session state
//! machine over any [`reader::LineSource`]. The public modules expose the
//! pieces it is built from so they can be reused or replaced in tests.

pub mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod external;
mod interpreter;
pub mod io_adapters;
pub mod lexer;
pub mod logging;
pub mod parser;
pub mod reader;

/// Convenient re-exports of the session driver.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::{Interpreter, RestartChoice, SessionEnd, State};
