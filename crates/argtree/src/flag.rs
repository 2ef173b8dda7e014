use std::{fmt, str::FromStr};

use crate::{lex, matches::Value, Result};

pub(crate) type Check = Box<dyn Fn(&str) -> bool>;
pub(crate) type Convert = Box<dyn Fn(&str) -> String>;

/// Options the driver handles itself instead of reporting a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Builtin {
    Help,
    Version,
}

/// A named option of a [`Command`](crate::Command), matched by one or more
/// flag literals such as `-v` and `--verbose`.
pub struct Flag {
    name: String,
    flags: Vec<String>,
    takes_value: bool,
    help: Option<String>,
    default: Option<String>,
    validate: Option<Check>,
    convert: Option<Convert>,
    on_match: Option<Box<dyn Fn(&Value)>>,
    pub(crate) builtin: Option<Builtin>,
}

impl Flag {
    pub(crate) fn new(name: &str, spec: &str, takes_value: bool) -> Result<Flag> {
        let flags = lex::flag_spec(spec)?;
        Ok(Flag {
            name: name.to_string(),
            flags,
            takes_value,
            help: None,
            default: None,
            validate: None,
            convert: None,
            on_match: None,
            builtin: None,
        })
    }

    pub(crate) fn builtin(kind: Builtin) -> Flag {
        let (name, flags, help): (&str, &[&str], &str) = match kind {
            Builtin::Help => ("help", &["-h", "--help"][..], "Print help information."),
            Builtin::Version => ("version", &["--version"][..], "Print version info."),
        };
        Flag {
            name: name.to_string(),
            flags: flags.iter().map(|it| it.to_string()).collect(),
            takes_value: false,
            help: Some(help.to_string()),
            default: None,
            validate: None,
            convert: None,
            on_match: None,
            builtin: Some(kind),
        }
    }

    pub fn help(&mut self, text: &str) -> &mut Flag {
        self.help = Some(text.to_string());
        self
    }

    /// Value reported when a value taking option is not given.
    pub fn default(&mut self, value: &str) -> &mut Flag {
        self.default = Some(value.to_string());
        self
    }

    pub fn validate(&mut self, f: impl Fn(&str) -> bool + 'static) -> &mut Flag {
        self.validate = Some(Box::new(f));
        self
    }

    /// Accepts only values that parse as `T`.
    pub fn parses<T: FromStr>(&mut self) -> &mut Flag {
        self.validate(|raw| raw.parse::<T>().is_ok())
    }

    /// Rewrites an accepted value before it is stored.
    pub fn convert(&mut self, f: impl Fn(&str) -> String + 'static) -> &mut Flag {
        self.convert = Some(Box::new(f));
        self
    }

    /// Called with the new value every time the option occurs.
    pub fn on_match(&mut self, f: impl Fn(&Value) + 'static) -> &mut Flag {
        self.on_match = Some(Box::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn is_flag(&self, token: &str) -> bool {
        self.flags.iter().any(|it| it == token)
    }

    pub fn takes_value(&self) -> bool {
        self.takes_value
    }

    pub fn is_valid(&self, raw: &str) -> bool {
        self.validate.as_ref().map_or(true, |f| f(raw))
    }

    /// The value this option has before the command line mentions it.
    pub fn default_value(&self) -> Option<Value> {
        if self.takes_value {
            self.default.clone().map(Value::One)
        } else {
            Some(Value::Bool(false))
        }
    }

    /// Computes the value for one occurrence of the option and fires the
    /// `on_match` hook. `raw` must be `Some` exactly when the option takes a
    /// value.
    pub fn update(&self, raw: Option<&str>) -> Value {
        let value = match raw {
            Some(raw) => Value::One(match &self.convert {
                Some(f) => f(raw),
                None => raw.to_string(),
            }),
            None => Value::Bool(true),
        };
        if let Some(f) = &self.on_match {
            f(&value)
        }
        value
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flag")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("takes_value", &self.takes_value)
            .finish_non_exhaustive()
    }
}
