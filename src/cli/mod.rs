//! CLI module
//!
//! Command-line front end over an HTTP-backed paginator.
//!
//! # Commands
//!
//! - `fetch` - Load pages until the source is exhausted and print the items
//! - `shell` - Drive a paginator interactively from stdin
//! - `validate` - Print the resolved configuration

mod commands;
mod runner;
mod shell;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
pub use shell::ShellCommand;
