use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::{
    bail,
    flag::{Check, Convert},
    matches::Value,
    Error, ErrorKind, Result,
};

/// How many arguments an [`Operand`] takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    /// Zero or more, written `*`.
    Any,
}

impl Arity {
    pub fn min(self) -> usize {
        match self {
            Arity::Exactly(n) => n,
            Arity::Any => 0,
        }
    }

    /// `None` means unbounded.
    pub fn max(self) -> Option<usize> {
        match self {
            Arity::Exactly(n) => Some(n),
            Arity::Any => None,
        }
    }
}

impl From<usize> for Arity {
    fn from(n: usize) -> Arity {
        Arity::Exactly(n)
    }
}

impl FromStr for Arity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Arity> {
        if s == "*" {
            return Ok(Arity::Any);
        }
        match s.parse::<usize>() {
            Ok(n) => Ok(Arity::Exactly(n)),
            Err(err) => bail!(ErrorKind::Build, "invalid arity `{s}`, {err}"),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => fmt::Display::fmt(n, f),
            Arity::Any => f.write_str("*"),
        }
    }
}

/// A positional argument slot of a [`Command`](crate::Command).
pub struct Operand {
    name: String,
    arity: Arity,
    help: Option<String>,
    validate: Option<Check>,
    convert: Option<Convert>,
}

impl Operand {
    pub(crate) fn new(name: &str, arity: Arity) -> Operand {
        Operand { name: name.to_string(), arity, help: None, validate: None, convert: None }
    }

    pub fn help(&mut self, text: &str) -> &mut Operand {
        self.help = Some(text.to_string());
        self
    }

    pub fn validate(&mut self, f: impl Fn(&str) -> bool + 'static) -> &mut Operand {
        self.validate = Some(Box::new(f));
        self
    }

    pub fn parses<T: FromStr>(&mut self) -> &mut Operand {
        self.validate(|raw| raw.parse::<T>().is_ok())
    }

    pub fn convert(&mut self, f: impl Fn(&str) -> String + 'static) -> &mut Operand {
        self.convert = Some(Box::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// `(min, max)` count of arguments, `max` is `None` when unbounded.
    pub fn expected(&self) -> (usize, Option<usize>) {
        (self.arity.min(), self.arity.max())
    }

    pub fn is_valid(&self, raw: &str) -> bool {
        self.validate.as_ref().map_or(true, |f| f(raw))
    }

    fn update(&self, raw: String) -> String {
        match &self.convert {
            Some(f) => f(&raw),
            None => raw,
        }
    }

    fn value(&self, mut data: Vec<String>) -> Value {
        match (self.arity, data.pop()) {
            (Arity::Exactly(1), Some(it)) if data.is_empty() => Value::One(it),
            (_, last) => {
                data.extend(last);
                Value::Many(data)
            }
        }
    }
}

impl fmt::Debug for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operand")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Summed `(min, max)` over a command's operands.
pub(crate) fn bounds(operands: &[Operand]) -> (usize, Option<usize>) {
    operands.iter().fold((0, Some(0)), |(min, max), it| {
        let (lo, hi) = it.expected();
        (min + lo, max.zip(hi).map(|(a, b)| a + b))
    })
}

/// Hands out `args` to `operands` left to right. Fixed operands take exactly
/// their count; the unbounded one takes whatever is left after reserving
/// the minimum of every operand behind it.
pub(crate) fn distribute(
    operands: &[Operand],
    args: Vec<String>,
) -> Result<BTreeMap<String, Value>> {
    let available = args.len();
    let (min, max) = bounds(operands);
    if available < min {
        bail!(
            ErrorKind::OperandCount,
            "not enough arguments -- available {available}, expected {min}"
        );
    }
    if let Some(max) = max {
        if available > max {
            bail!(
                ErrorKind::OperandCount,
                "too many arguments -- available {available}, expected {max}"
            );
        }
    }

    let mut args = args.into_iter();
    let mut res = BTreeMap::new();
    for (i, operand) in operands.iter().enumerate() {
        let take = match operand.arity {
            Arity::Exactly(n) => n,
            Arity::Any => {
                let reserved = bounds(&operands[i + 1..]).0;
                args.len() - reserved
            }
        };
        let mut data = Vec::with_capacity(take);
        for raw in args.by_ref().take(take) {
            if !operand.is_valid(&raw) {
                bail!(
                    ErrorKind::InvalidOperandValue,
                    "invalid value `{raw}` for operand `{}`",
                    operand.name
                );
            }
            data.push(operand.update(raw));
        }
        res.insert(operand.name.clone(), operand.value(data));
    }
    Ok(res)
}
