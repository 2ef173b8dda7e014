use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::{bail, ErrorKind, Result};

/// The value of an option or operand after parsing.
#[derive(Clone, PartialEq, Eq)]
pub enum Value {
    /// An option that takes no value: whether it was given.
    Bool(bool),
    /// A value taking option, or an operand of arity one.
    One(String),
    /// Any other operand.
    Many(Vec<String>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(it) => Some(*it),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::One(it) => Some(it),
            _ => None,
        }
    }

    /// All strings held by the value, one for `One`, none for `Bool`.
    pub fn as_slice(&self) -> &[String] {
        match self {
            Value::Bool(_) => &[],
            Value::One(it) => std::slice::from_ref(it),
            Value::Many(it) => it,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(it) => fmt::Debug::fmt(it, f),
            Value::One(it) => fmt::Debug::fmt(it, f),
            Value::Many(it) => fmt::Debug::fmt(it, f),
        }
    }
}

/// What one command level resolved to: option values by option name and
/// operand values by operand name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matches {
    pub(crate) command: String,
    pub(crate) options: BTreeMap<String, Value>,
    pub(crate) operands: BTreeMap<String, Value>,
}

impl Matches {
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn options(&self) -> &BTreeMap<String, Value> {
        &self.options
    }

    pub fn operands(&self) -> &BTreeMap<String, Value> {
        &self.operands
    }

    /// Looks `name` up among options first, then operands.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.options.get(name).or_else(|| self.operands.get(name))
    }

    pub fn flag(&self, name: &str) -> bool {
        self.lookup(name).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.lookup(name).and_then(Value::as_str)
    }

    pub fn values(&self, name: &str) -> &[String] {
        self.lookup(name).map(Value::as_slice).unwrap_or_default()
    }

    pub fn get<T: FromStr>(&self, name: &str) -> Result<Option<T>>
    where
        T::Err: fmt::Display,
    {
        match self.value(name) {
            Some(raw) => match raw.parse::<T>() {
                Ok(it) => Ok(Some(it)),
                Err(err) => bail!(ErrorKind::InvalidOptionValue, "Can't parse `{name}`, {err}"),
            },
            None => Ok(None),
        }
    }
}
