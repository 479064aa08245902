//! Interactive shell commands

use crate::error::{Error, Result};

/// Help text printed by `help`
pub const HELP: &str = "\
commands:
  start        load the first page
  refresh      re-fetch the first page
  refresh!     restart a running refresh
  more         load the next page
  stop         release the paginator
  size         number of loaded items
  state        current snapshot
  get N        item at index N
  list         every loaded item
  help         this text
  quit         leave the shell";

/// One line of shell input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    /// Load the first page
    Start,
    /// Re-fetch the first page
    Refresh { force: bool },
    /// Load the next page
    More,
    /// Release the paginator
    Stop,
    /// Print the item count
    Size,
    /// Print the snapshot
    State,
    /// Print one item
    Get(usize),
    /// Print every item
    List,
    /// Print the help text
    Help,
    /// Leave the shell
    Quit,
}

impl ShellCommand {
    /// Parse a line; blank lines and `#` comments yield `None`
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default();
        let argument = words.next();

        let parsed = match (command, argument) {
            ("start", None) => Self::Start,
            ("refresh", None) => Self::Refresh { force: false },
            ("refresh!", None) => Self::Refresh { force: true },
            ("more" | "next", None) => Self::More,
            ("stop", None) => Self::Stop,
            ("size" | "len", None) => Self::Size,
            ("state", None) => Self::State,
            ("get", Some(index)) => {
                let index = index
                    .parse()
                    .map_err(|_| Error::config(format!("Not an index: '{index}'")))?;
                Self::Get(index)
            }
            ("get", None) => return Err(Error::config("get needs an index")),
            ("list" | "ls", None) => Self::List,
            ("help" | "?", None) => Self::Help,
            ("quit" | "exit", None) => Self::Quit,
            _ => return Err(Error::config(format!("Unknown command: '{line}'"))),
        };
        Ok(Some(parsed))
    }
}
