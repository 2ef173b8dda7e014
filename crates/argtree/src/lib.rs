//! Command line parser for trees of sub-commands.
//!
//! A program describes its interface as a tree of [`Command`]s. Each command
//! owns options ([`Flag`]), positional operands ([`Operand`]) and named
//! children. Parsing walks the argument vector left to right, resolving one
//! [`Matches`] record per command level and invoking that level's action.
//!
//! ```
//! use argtree::{Arity, Command};
//!
//! let mut cmd = Command::new("cp");
//! cmd.add_option("recursive", "-r | --recursive", false)?;
//! cmd.add_operand("source", Arity::Any)?;
//! cmd.add_operand("dest", Arity::Exactly(1))?;
//!
//! let matches = cmd.try_parse(["-r", "a", "b", "dir"])?;
//! assert!(matches[0].flag("recursive"));
//! assert_eq!(matches[0].values("source"), ["a", "b"]);
//! assert_eq!(matches[0].value("dest"), Some("dir"));
//! # Ok::<(), argtree::Error>(())
//! ```
//!
//! Syntax accepted on the command line:
//!
//! * `-x`: short flag, `-xvf` is the same as `-x -v -f`. A value taking
//!   short flag uses the rest of the cluster (`-n92`) or the next argument.
//! * `--name`, `--name value`, `--name=value`: long flags.
//! * `--`: everything after it is an operand.
//! * anything else is an operand, or a sub-command name once the current
//!   command has no room left for operands.
//!
//! [`App`] adds the usual driver on top: `--help`, `--version`, a `help`
//! sub-command and exiting the process on errors.

mod app;
mod command;
mod flag;
mod help;
mod lex;
mod matches;
mod operand;

use std::fmt;

pub use crate::{
    app::App,
    command::Command,
    flag::Flag,
    help::render as render_help,
    matches::{Matches, Value},
    operand::{Arity, Operand},
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

macro_rules! format_err {
    ($kind:expr, $($tt:tt)*) => {
        $crate::Error::new($kind, format!($($tt)*))
    };
}

macro_rules! bail {
    ($kind:expr, $($tt:tt)*) => {
        return Err($crate::format_err!($kind, $($tt)*))
    };
}

pub(crate) use {bail, format_err};

/// What went wrong while building or parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A flag-shaped argument no option of the command claims.
    UnknownOption,
    /// A value taking option was last on the command line.
    MissingOptionValue,
    /// An option value was rejected by the option's validator.
    InvalidOptionValue,
    /// `--flag=value` was given for an option that takes no value.
    UnexpectedOptionValue,
    /// Too few or too many operands for the command.
    OperandCount,
    /// An operand was rejected by the operand's validator.
    InvalidOperandValue,
    /// A bare argument that is neither an operand nor a sub-command.
    UnresolvedToken,
    /// `help` was asked about a command that doesn't exist.
    UnknownCommand,
    /// An argument is not valid unicode.
    InvalidUtf8,
    /// The command tree itself is malformed.
    Build,
    /// Not a failure: help text was requested, the message holds it.
    DisplayHelp,
    /// Not a failure: version info was requested, the message holds it.
    DisplayVersion,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    msg: String,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, msg: String) -> Error {
        Error { kind, msg }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Whether the "error" is a request for help or version text, which
    /// should go to stdout with a successful exit status.
    pub fn is_help(&self) -> bool {
        matches!(self.kind, ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
    }

    pub fn exit(self) -> ! {
        if self.is_help() {
            println!("{self}");
            std::process::exit(0)
        } else {
            eprintln!("{self}");
            std::process::exit(2)
        }
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.msg, f)
    }
}
