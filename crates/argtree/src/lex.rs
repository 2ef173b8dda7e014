//! Token queue and the surface grammar of command line arguments.
use std::ffi::OsString;

use crate::{bail, ErrorKind, Result};

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Token {
    /// `-x` or a cluster of short flags like `-xvf`, without the dash.
    Short(String),
    /// `--name` or `--name=value`; `flag` keeps the dashes.
    Long { flag: String, value: Option<String> },
    /// Anything that is not flag-shaped.
    Bare(String),
    /// An argument after `--`.
    Literal(String),
}

pub(crate) struct Tokens {
    after_double_dash: bool,
    rargs: Vec<String>,
}

impl Tokens {
    pub(crate) fn new<I>(args: I) -> Result<Tokens>
    where
        I: IntoIterator,
        I::Item: Into<OsString>,
    {
        let mut rargs = args
            .into_iter()
            .map(|arg| match arg.into().into_string() {
                Ok(it) => Ok(it),
                // Debug formatting escapes invalid sequences instead of replacing them.
                Err(it) => bail!(ErrorKind::InvalidUtf8, "invalid utf8 in argument: {it:?}"),
            })
            .collect::<Result<Vec<_>>>()?;
        rargs.reverse();
        Ok(Tokens { after_double_dash: false, rargs })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rargs.is_empty()
    }

    pub(crate) fn next_token(&mut self) -> Option<Token> {
        let arg = self.rargs.pop()?;
        if self.after_double_dash {
            return Some(Token::Literal(arg));
        }
        if arg == "--" {
            self.after_double_dash = true;
            return self.next_token();
        }
        let token = classify(arg);
        tracing::trace!(?token, "classified");
        Some(token)
    }

    /// Takes the next argument verbatim, as the value of an option.
    pub(crate) fn next_value(&mut self) -> Option<String> {
        self.rargs.pop()
    }
}

pub(crate) fn classify(arg: String) -> Token {
    if let Some(rest) = arg.strip_prefix("--") {
        let (name, value) = match rest.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (rest, None),
        };
        if is_long_name(name) {
            let flag = format!("--{name}");
            let value = value.map(str::to_string);
            return Token::Long { flag, value };
        }
    } else if let Some(rest) = arg.strip_prefix('-') {
        if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Token::Short(rest.to_string());
        }
    }
    Token::Bare(arg)
}

fn is_long_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
        }
        _ => false,
    }
}

/// Splits a declaration such as `-h | --help` into its flag literals.
pub(crate) fn flag_spec(spec: &str) -> Result<Vec<String>> {
    let mut res = Vec::new();
    for alt in spec.split('|').map(str::trim) {
        let ok = match classify(alt.to_string()) {
            Token::Short(letters) => letters.len() == 1,
            Token::Long { value, .. } => value.is_none(),
            Token::Bare(_) | Token::Literal(_) => false,
        };
        if !ok {
            bail!(ErrorKind::Build, "invalid flag `{alt}` in `{spec}`, expected `-x` or `--name`");
        }
        res.push(alt.to_string());
    }
    Ok(res)
}
