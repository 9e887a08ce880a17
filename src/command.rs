//! Line-oriented command protocol over a `DosTree<i64, i64>`.
//!
//! Each line holds one command followed by whitespace-separated integer arguments:
//!
//! ```text
//! insert 5
//! delete 4
//! find 7
//! rank 8
//! select 2
//! update 7 70
//! rebalance
//! ```
//!
//! Command names are lowercase and matched exactly. `insert` stores the key as its own value.
//! Responses render as the confirmation lines printed by the `dost` binary.
//!
//! # Examples
//!
//! ```
//! use dos_tree::DosTree;
//! use dos_tree::command::run_line;
//!
//! let mut tree = DosTree::new();
//! let reply = run_line(&mut tree, "insert 5").unwrap().unwrap();
//! assert_eq!(reply.to_string(), "Node with key 5 inserted successfully.");
//!
//! let reply = run_line(&mut tree, "rank 5").unwrap().unwrap();
//! assert_eq!(reply.to_string(), "Rank of node with key 5: 1");
//!
//! assert!(run_line(&mut tree, "   ").is_none());
//! ```

use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

use log::{debug, trace};
use thiserror::Error;

use crate::{DosTree, InvariantViolation};

/// Key type of the protocol.
pub type Key = i64;
/// Payload type of the protocol.
pub type Value = i64;

/// One parsed protocol line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    /// `insert K`: add `K` with itself as the value.
    Insert(Key),
    /// `delete K`: remove one entry with key `K`.
    Delete(Key),
    /// `find K`: report the value stored with `K`.
    Find(Key),
    /// `rank K`: report the 1-based position of `K`.
    Rank(Key),
    /// `select R`: report the key at 1-based position `R`.
    ///
    /// Ranks are parsed signed so that `select 0` and `select -1` report out of range.
    Select(i64),
    /// `update K V`: replace the value stored with `K`.
    Update(Key, Value),
    /// `rebalance`: check the tree and confirm it is balanced.
    Rebalance,
}

/// Why a line could not be parsed.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ParseError {
    /// The line holds no tokens.
    #[error("empty command")]
    Empty,

    /// The first token is not a command name.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// The line ends before a required argument.
    #[error("'{command}' expects an argument <{name}>")]
    MissingArgument {
        /// Name of the command.
        command: &'static str,
        /// Name of the missing argument.
        name: &'static str,
    },

    /// An argument does not parse as an `i64`.
    #[error("'{command}' argument <{name}> is not an integer: '{token}'")]
    InvalidInteger {
        /// Name of the command.
        command: &'static str,
        /// Name of the argument.
        name: &'static str,
        /// The offending token.
        token: String,
    },

    /// Tokens remain after the last argument.
    #[error("'{command}' takes {expected} argument(s)")]
    TooManyArguments {
        /// Name of the command.
        command: &'static str,
        /// Number of arguments the command takes.
        expected: usize,
    },
}

/// Failure to run a line.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum CommandError {
    /// The line was malformed; the tree is untouched.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// `rebalance` found the tree corrupt.
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

/// The outcome of a command; `Display` renders the protocol's reply line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Response {
    /// `Node with key K inserted successfully.`
    Inserted { key: Key },
    /// `Node with key K deleted successfully.`
    Deleted { key: Key },
    /// `Key K not found.`, from `delete`.
    DeleteMissing { key: Key },
    /// `Node with key K found. Value: V`
    Found { key: Key, value: Value },
    /// `No node with key K found.`, from `find`, `rank` and `update`.
    Missing { key: Key },
    /// `Rank of node with key K: R`
    Rank { key: Key, rank: usize },
    /// `Key at rank R: K`
    Selected { rank: usize, key: Key },
    /// `No node at rank R found.`
    OutOfRange { rank: i64 },
    /// `Node with key K updated to V.`
    Updated { key: Key, value: Value },
    /// `Tree rebalanced successfully.`
    Rebalanced,
}

impl Command {
    /// The protocol name of the command.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Command::Insert(_) => "insert",
            Command::Delete(_) => "delete",
            Command::Find(_) => "find",
            Command::Rank(_) => "rank",
            Command::Select(_) => "select",
            Command::Update(..) => "update",
            Command::Rebalance => "rebalance",
        }
    }

    /// Returns `true` for commands that can change the tree.
    #[must_use]
    pub fn is_mutating(&self) -> bool {
        matches!(self, Command::Insert(_) | Command::Delete(_) | Command::Update(..))
    }
}

/// Pulls the next token as an integer argument.
fn integer<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    name: &'static str,
) -> Result<i64, ParseError> {
    let token = tokens.next().ok_or(ParseError::MissingArgument { command, name })?;
    token.parse().map_err(|_| ParseError::InvalidInteger {
        command,
        name,
        token: token.to_string(),
    })
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let name = tokens.next().ok_or(ParseError::Empty)?;

        let (command, expected) = if name == "insert" {
            (Command::Insert(integer(&mut tokens, "insert", "key")?), 1)
        } else if name == "delete" {
            (Command::Delete(integer(&mut tokens, "delete", "key")?), 1)
        } else if name == "find" {
            (Command::Find(integer(&mut tokens, "find", "key")?), 1)
        } else if name == "rank" {
            (Command::Rank(integer(&mut tokens, "rank", "key")?), 1)
        } else if name == "select" {
            (Command::Select(integer(&mut tokens, "select", "rank")?), 1)
        } else if name == "update" {
            let key = integer(&mut tokens, "update", "key")?;
            let value = integer(&mut tokens, "update", "value")?;
            (Command::Update(key, value), 2)
        } else if name == "rebalance" {
            (Command::Rebalance, 0)
        } else {
            return Err(ParseError::UnknownCommand(name.to_string()));
        };

        if tokens.next().is_some() {
            return Err(ParseError::TooManyArguments {
                command: command.name(),
                expected,
            });
        }

        Ok(command)
    }
}

/// Applies `command` to `tree`.
///
/// # Errors
///
/// Only `rebalance` can fail: it checks the tree and reports the violation if the tree is
/// corrupt. The red-black invariants keep the tree balanced after every mutation, so there is
/// nothing to restructure.
pub fn execute(tree: &mut DosTree<Key, Value>, command: Command) -> Result<Response, InvariantViolation> {
    trace!("execute {command:?}");
    let response = match command {
        Command::Insert(key) => {
            tree.insert(key, key);
            Response::Inserted { key }
        }
        Command::Delete(key) => match tree.delete(&key) {
            Ok(_) => Response::Deleted { key },
            Err(_) => Response::DeleteMissing { key },
        },
        Command::Find(key) => match tree.find(&key) {
            Ok(&value) => Response::Found { key, value },
            Err(_) => Response::Missing { key },
        },
        Command::Rank(key) => match tree.rank(&key) {
            Ok(rank) => Response::Rank { key, rank },
            Err(_) => Response::Missing { key },
        },
        Command::Select(rank) => {
            let selected = usize::try_from(rank)
                .ok()
                .and_then(|r| tree.select(r).ok().map(|&key| (r, key)));
            match selected {
                Some((rank, key)) => Response::Selected { rank, key },
                None => Response::OutOfRange { rank },
            }
        }
        Command::Update(key, value) => match tree.update(&key, value) {
            Ok(_) => Response::Updated { key, value },
            Err(_) => Response::Missing { key },
        },
        Command::Rebalance => {
            tree.validate()?;
            debug!("rebalance: {} entries, height {}", tree.len(), tree.height());
            Response::Rebalanced
        }
    };
    Ok(response)
}

/// Parses and executes one line. Returns `None` for blank lines.
///
/// # Errors
///
/// Returns [`CommandError::Parse`] for a malformed line (the tree is untouched) and
/// [`CommandError::Invariant`] if `rebalance` finds the tree corrupt.
pub fn run_line(tree: &mut DosTree<Key, Value>, line: &str) -> Option<Result<Response, CommandError>> {
    if line.trim().is_empty() {
        return None;
    }

    Some(
        line.parse::<Command>()
            .map_err(CommandError::from)
            .and_then(|command| execute(tree, command).map_err(CommandError::from)),
    )
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Inserted { key } => write!(f, "Node with key {key} inserted successfully."),
            Response::Deleted { key } => write!(f, "Node with key {key} deleted successfully."),
            Response::DeleteMissing { key } => write!(f, "Key {key} not found."),
            Response::Found { key, value } => write!(f, "Node with key {key} found. Value: {value}"),
            Response::Missing { key } => write!(f, "No node with key {key} found."),
            Response::Rank { key, rank } => write!(f, "Rank of node with key {key}: {rank}"),
            Response::Selected { rank, key } => write!(f, "Key at rank {rank}: {key}"),
            Response::OutOfRange { rank } => write!(f, "No node at rank {rank} found."),
            Response::Updated { key, value } => write!(f, "Node with key {key} updated to {value}."),
            Response::Rebalanced => f.write_str("Tree rebalanced successfully."),
        }
    }
}
