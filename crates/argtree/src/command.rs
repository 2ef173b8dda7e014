use std::{collections::BTreeMap, ffi::OsString, fmt};

use crate::{
    bail,
    flag::{Builtin, Flag},
    format_err, help,
    lex::{Token, Tokens},
    matches::{Matches, Value},
    operand::{self, Arity, Operand},
    Error, ErrorKind, Result,
};

/// A node of the command tree.
///
/// The tree is only read while parsing; values end up in the [`Matches`]
/// returned for each level, so the same tree can be parsed any number of
/// times.
pub struct Command {
    name: String,
    description: Option<String>,
    options: Vec<Flag>,
    operands: Vec<Operand>,
    subcommands: Vec<Command>,
    action: Option<Box<dyn Fn(&Matches)>>,
    pub(crate) help_command: bool,
}

/// State threaded through one parse, across all levels.
pub(crate) struct Session<'a> {
    pub(crate) root: &'a Command,
    pub(crate) version: Option<String>,
    pub(crate) path: Vec<Matches>,
}

impl<'a> Session<'a> {
    pub(crate) fn new(root: &'a Command) -> Session<'a> {
        Session { root, version: None, path: Vec::new() }
    }
}

impl Command {
    pub fn new(name: &str) -> Command {
        Command {
            name: name.to_string(),
            description: None,
            options: Vec::new(),
            operands: Vec::new(),
            subcommands: Vec::new(),
            action: None,
            help_command: false,
        }
    }

    pub fn set_description(&mut self, text: &str) -> &mut Command {
        self.description = Some(text.to_string());
        self
    }

    /// Called with this level's values once the level is resolved, before
    /// any sub-command is parsed.
    pub fn set_action(&mut self, f: impl Fn(&Matches) + 'static) -> &mut Command {
        self.action = Some(Box::new(f));
        self
    }

    /// Declares an option. `spec` lists its flags separated by `|`, like
    /// `-v | --verbose`.
    pub fn add_option(&mut self, name: &str, spec: &str, takes_value: bool) -> Result<&mut Flag> {
        let flag = Flag::new(name, spec, takes_value)?;
        self.push_option(flag)
    }

    pub(crate) fn push_option(&mut self, flag: Flag) -> Result<&mut Flag> {
        if self.options.iter().any(|it| it.name() == flag.name()) {
            let name = flag.name();
            bail!(ErrorKind::Build, "option `{name}` is defined twice for `{}`", self.name);
        }
        for (i, lit) in flag.flags().iter().enumerate() {
            if flag.flags()[..i].contains(lit) {
                let name = flag.name();
                bail!(ErrorKind::Build, "flag `{lit}` is listed twice for option `{name}`");
            }
            if let Some(other) = self.find_option(lit) {
                bail!(
                    ErrorKind::Build,
                    "flag `{lit}` of option `{}` is already used by option `{}`",
                    flag.name(),
                    other.name()
                );
            }
        }
        let idx = self.options.len();
        self.options.push(flag);
        Ok(&mut self.options[idx])
    }

    /// Adds an option handled by the driver, before any user option exists.
    pub(crate) fn push_builtin(&mut self, flag: Flag) {
        self.options.push(flag);
    }

    /// Declares the next positional operand. At most one operand of a
    /// command may be [`Arity::Any`].
    pub fn add_operand(&mut self, name: &str, arity: Arity) -> Result<&mut Operand> {
        if self.operands.iter().any(|it| it.name() == name) {
            bail!(ErrorKind::Build, "operand `{name}` is defined twice for `{}`", self.name);
        }
        if arity == Arity::Any {
            if let Some(other) = self.operands.iter().find(|it| it.arity() == Arity::Any) {
                bail!(
                    ErrorKind::Build,
                    "`{}` can't have two unbounded operands: `{}` and `{name}`",
                    self.name,
                    other.name()
                );
            }
        }
        let idx = self.operands.len();
        self.operands.push(Operand::new(name, arity));
        Ok(&mut self.operands[idx])
    }

    pub fn add_command(&mut self, name: &str) -> Result<&mut Command> {
        if name.is_empty() || name.starts_with('-') {
            bail!(ErrorKind::Build, "invalid command name `{name}`");
        }
        if self.subcommand(name).is_some() {
            bail!(ErrorKind::Build, "command `{name}` is defined twice for `{}`", self.name);
        }
        let idx = self.subcommands.len();
        self.subcommands.push(Command::new(name));
        Ok(&mut self.subcommands[idx])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn options(&self) -> &[Flag] {
        &self.options
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    pub fn subcommands(&self) -> &[Command] {
        &self.subcommands
    }

    pub fn subcommand(&self, name: &str) -> Option<&Command> {
        self.subcommands.iter().find(|it| it.name == name)
    }

    /// The first option claiming `flag`.
    pub fn find_option(&self, flag: &str) -> Option<&Flag> {
        self.options.iter().find(|it| it.is_flag(flag))
    }

    /// Total `(min, max)` operand count, `max` is `None` when unbounded.
    pub fn operand_bounds(&self) -> (usize, Option<usize>) {
        operand::bounds(&self.operands)
    }

    /// Parses `args` (without the program name), returning the values of
    /// every command level visited, root first.
    pub fn try_parse<I>(&self, args: I) -> Result<Vec<Matches>>
    where
        I: IntoIterator,
        I::Item: Into<OsString>,
    {
        let mut tokens = Tokens::new(args)?;
        let mut session = Session::new(self);
        self.dispatch(&mut tokens, &mut session)?;
        Ok(session.path)
    }

    /// Like [`Command::try_parse`], but reports the error and exits.
    pub fn parse<I>(&self, args: I) -> Vec<Matches>
    where
        I: IntoIterator,
        I::Item: Into<OsString>,
    {
        self.try_parse(args).unwrap_or_else(|err| err.exit())
    }

    pub(crate) fn dispatch(&self, tokens: &mut Tokens, session: &mut Session<'_>) -> Result<()> {
        let (_, capacity) = self.operand_bounds();
        let mut options = self.default_options();
        let mut pending = Vec::new();

        while let Some(token) = tokens.next_token() {
            match token {
                Token::Literal(arg) => pending.push(arg),
                Token::Short(cluster) => {
                    self.short_cluster(&cluster, tokens, &mut options, session)?
                }
                Token::Long { flag, value } => {
                    let option = self.option_for(&flag)?;
                    let raw = match (option.takes_value(), value) {
                        (true, Some(value)) => Some(value),
                        (true, None) => Some(next_value(tokens, &flag)?),
                        (false, Some(_)) => {
                            bail!(
                                ErrorKind::UnexpectedOptionValue,
                                "flag `{flag}` doesn't take a value"
                            )
                        }
                        (false, None) => None,
                    };
                    self.apply(option, &flag, raw, &mut options, session)?;
                }
                Token::Bare(arg) => {
                    if capacity.map_or(true, |max| pending.len() < max) {
                        pending.push(arg);
                        continue;
                    }
                    match self.subcommand(&arg) {
                        Some(sub) => {
                            self.finish(options, pending, session)?;
                            tracing::debug!(parent = %self.name, "entering `{arg}`");
                            return sub.dispatch(tokens, session);
                        }
                        None => bail!(ErrorKind::UnresolvedToken, "too many arguments for `{arg}`"),
                    }
                }
            }
        }
        self.finish(options, pending, session)
    }

    fn short_cluster(
        &self,
        cluster: &str,
        tokens: &mut Tokens,
        options: &mut BTreeMap<String, Value>,
        session: &Session<'_>,
    ) -> Result<()> {
        for (i, letter) in cluster.char_indices() {
            let flag = format!("-{letter}");
            let option = self.option_for(&flag)?;
            if option.takes_value() {
                let rest = &cluster[i + letter.len_utf8()..];
                let raw =
                    if rest.is_empty() { next_value(tokens, &flag)? } else { rest.to_string() };
                return self.apply(option, &flag, Some(raw), options, session);
            }
            self.apply(option, &flag, None, options, session)?;
        }
        Ok(())
    }

    fn option_for(&self, flag: &str) -> Result<&Flag> {
        self.find_option(flag)
            .ok_or_else(|| format_err!(ErrorKind::UnknownOption, "unknown argument `{flag}`"))
    }

    fn apply(
        &self,
        option: &Flag,
        flag: &str,
        raw: Option<String>,
        options: &mut BTreeMap<String, Value>,
        session: &Session<'_>,
    ) -> Result<()> {
        match option.builtin {
            Some(Builtin::Help) => {
                return Err(Error::new(ErrorKind::DisplayHelp, help::render(self)));
            }
            Some(Builtin::Version) => {
                let version = session.version.clone().unwrap_or_default();
                return Err(Error::new(ErrorKind::DisplayVersion, version));
            }
            None => (),
        }
        if let Some(raw) = &raw {
            if !option.is_valid(raw) {
                bail!(ErrorKind::InvalidOptionValue, "invalid value `{raw}` for `{flag}`");
            }
        }
        let value = option.update(raw.as_deref());
        options.insert(option.name().to_string(), value);
        Ok(())
    }

    fn default_options(&self) -> BTreeMap<String, Value> {
        self.options
            .iter()
            .filter(|it| it.builtin.is_none())
            .filter_map(|it| Some((it.name().to_string(), it.default_value()?)))
            .collect()
    }

    fn finish(
        &self,
        options: BTreeMap<String, Value>,
        pending: Vec<String>,
        session: &mut Session<'_>,
    ) -> Result<()> {
        let operands = operand::distribute(&self.operands, pending)?;
        let matches = Matches { command: self.name.clone(), options, operands };
        tracing::debug!(?matches, "resolved");

        if self.help_command {
            let help = help::render_path(session.root, matches.values("command"))?;
            return Err(Error::new(ErrorKind::DisplayHelp, help));
        }
        if let Some(action) = &self.action {
            action(&matches);
        }
        session.path.push(matches);
        Ok(())
    }
}

fn next_value(tokens: &mut Tokens, flag: &str) -> Result<String> {
    tokens
        .next_value()
        .ok_or_else(|| format_err!(ErrorKind::MissingOptionValue, "expected a value for `{flag}`"))
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("operands", &self.operands)
            .field("subcommands", &self.subcommands)
            .finish_non_exhaustive()
    }
}
