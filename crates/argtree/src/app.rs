use std::{collections::BTreeMap, ffi::OsString};

use crate::{
    command::{Command, Session},
    flag::{Builtin, Flag},
    help,
    lex::Tokens,
    Arity, Matches, Operand, Result,
};

/// The root of a program's command tree plus the driver around it.
///
/// On top of a plain [`Command`], an `App` understands `--version` and
/// `-h, --help` at the top level, gets a `help [command...]` sub-command as
/// soon as it has sub-commands, and can run a default action when the
/// program is invoked without arguments.
///
/// Settings are a string map used by the version template: `name`,
/// `version` and `version_string` always exist, any other key can be added
/// with [`App::set`].
pub struct App {
    root: Command,
    settings: BTreeMap<String, String>,
    default_action: Option<Box<dyn Fn()>>,
}

impl App {
    pub fn new(name: &str) -> App {
        let mut root = Command::new(name);
        root.push_builtin(Flag::builtin(Builtin::Version));
        root.push_builtin(Flag::builtin(Builtin::Help));

        let mut settings = BTreeMap::new();
        settings.insert("name".to_string(), name.to_string());
        settings.insert("version".to_string(), "0.0.0".to_string());
        settings.insert("version_string".to_string(), "${name} ${version}".to_string());

        App { root, settings, default_action: None }
    }

    pub fn set(&mut self, key: &str, value: &str) -> &mut App {
        self.settings.insert(key.to_string(), value.to_string());
        self
    }

    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    pub fn set_version(&mut self, version: &str) -> &mut App {
        self.set("version", version)
    }

    pub fn version(&self) -> &str {
        self.setting("version").unwrap_or_default()
    }

    /// Template for `--version`, `${key}` is replaced by the setting `key`.
    pub fn set_version_template(&mut self, template: &str) -> &mut App {
        self.set("version_string", template)
    }

    pub fn version_string(&self) -> String {
        let template = self.setting("version_string").unwrap_or_default();
        substitute(template, &self.settings)
    }

    /// Called after a successful parse of an empty argument list.
    pub fn set_default_action(&mut self, f: impl Fn() + 'static) -> &mut App {
        self.default_action = Some(Box::new(f));
        self
    }

    pub fn set_description(&mut self, text: &str) -> &mut App {
        self.root.set_description(text);
        self
    }

    pub fn set_action(&mut self, f: impl Fn(&Matches) + 'static) -> &mut App {
        self.root.set_action(f);
        self
    }

    pub fn add_option(&mut self, name: &str, spec: &str, takes_value: bool) -> Result<&mut Flag> {
        self.root.add_option(name, spec, takes_value)
    }

    pub fn add_operand(&mut self, name: &str, arity: Arity) -> Result<&mut Operand> {
        self.root.add_operand(name, arity)
    }

    pub fn add_command(&mut self, name: &str) -> Result<&mut Command> {
        if name != "help" && self.root.subcommand("help").is_none() {
            let cmd = self.root.add_command("help")?;
            cmd.set_description("Display help for a subcommand.");
            cmd.help_command = true;
            cmd.add_operand("command", Arity::Any)?.help("Command to get help for.");
        }
        self.root.add_command(name)
    }

    pub fn root(&self) -> &Command {
        &self.root
    }

    pub fn help(&self) -> String {
        help::render(&self.root)
    }

    pub fn try_parse<I>(&self, args: I) -> Result<Vec<Matches>>
    where
        I: IntoIterator,
        I::Item: Into<OsString>,
    {
        let mut tokens = Tokens::new(args)?;
        let no_args = tokens.is_empty();

        let mut session = Session::new(&self.root);
        session.version = Some(self.version_string());
        self.root.dispatch(&mut tokens, &mut session)?;

        if no_args {
            if let Some(f) = &self.default_action {
                tracing::debug!("no arguments, running the default action");
                f();
            }
        }
        Ok(session.path)
    }

    pub fn parse<I>(&self, args: I) -> Vec<Matches>
    where
        I: IntoIterator,
        I::Item: Into<OsString>,
    {
        self.try_parse(args).unwrap_or_else(|err| err.exit())
    }

    pub fn from_env(&self) -> Result<Vec<Matches>> {
        self.try_parse(std::env::args_os().skip(1))
    }

    pub fn from_env_or_exit(&self) -> Vec<Matches> {
        self.from_env().unwrap_or_else(|err| err.exit())
    }
}

/// Replaces `${key}` with `settings[key]`; unknown keys stay as they are.
fn substitute(template: &str, settings: &BTreeMap<String, String>) -> String {
    let mut res = String::new();
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        res.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            rest = &rest[start..];
            break;
        };
        let key = &after[..end];
        match settings.get(key) {
            Some(value) if !key.is_empty() => res.push_str(value),
            _ => push_placeholder(&mut res, key),
        }
        rest = &after[end + 1..];
    }
    res.push_str(rest);
    res
}

fn push_placeholder(buf: &mut String, key: &str) {
    buf.push_str("${");
    buf.push_str(key);
    buf.push('}');
}
