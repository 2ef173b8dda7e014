use std::fmt::Write;

use crate::{bail, Arity, Command, ErrorKind, Result};

macro_rules! w {
    ($($tt:tt)*) => {
        drop(write!($($tt)*))
    };
}

/// Help text for `cmd` and, nested below it, every sub-command.
pub fn render(cmd: &Command) -> String {
    let mut buf = String::new();
    help_rec(&mut buf, cmd.name(), cmd, false);
    finish(buf)
}

/// Help text for the command reached from `root` by following `path`.
pub(crate) fn render_path(root: &Command, path: &[String]) -> Result<String> {
    let mut cmd = root;
    let mut header = root.name().to_string();
    for (i, name) in path.iter().enumerate() {
        match cmd.subcommand(name) {
            Some(sub) => {
                cmd = sub;
                header.push(' ');
                header.push_str(name);
            }
            None => {
                let steps = path[..=i].join(" -> ");
                bail!(ErrorKind::UnknownCommand, "unknown command \"{steps}\"")
            }
        }
    }
    let mut buf = String::new();
    help_rec(&mut buf, &header, cmd, false);
    Ok(finish(buf))
}

fn finish(mut buf: String) -> String {
    buf.truncate(buf.trim_end().len());
    buf
}

fn help_rec(buf: &mut String, header: &str, cmd: &Command, nested: bool) {
    w!(buf, "{header}\n");
    if let Some(doc) = cmd.description() {
        write_lines_indented(buf, doc, 2);
    }
    let indent = if nested { "  " } else { "" };

    if !cmd.operands().is_empty() {
        blank_line(buf);
        w!(buf, "{indent}ARGS:\n");

        let mut blank = "";
        for operand in cmd.operands() {
            w!(buf, "{blank}");
            blank = "\n";

            let name = operand.name();
            match operand.arity() {
                Arity::Exactly(1) => w!(buf, "    <{name}>\n"),
                Arity::Exactly(n) => w!(buf, "    <{name}>{{{n}}}\n"),
                Arity::Any => w!(buf, "    [<{name}>...]\n"),
            }
            if let Some(doc) = operand.help_text() {
                write_lines_indented(buf, doc, 6);
            }
        }
    }

    if !cmd.options().is_empty() {
        blank_line(buf);
        w!(buf, "{indent}OPTIONS:\n");

        let mut blank = "";
        for option in cmd.options() {
            w!(buf, "{blank}");
            blank = "\n";

            let value =
                if option.takes_value() { format!(" <{}>", option.name()) } else { String::new() };
            w!(buf, "    {}{value}\n", option.flags().join(", "));
            if let Some(doc) = option.help_text() {
                write_lines_indented(buf, doc, 6);
            }
        }
    }

    if !cmd.subcommands().is_empty() {
        if !nested {
            blank_line(buf);
            w!(buf, "SUBCOMMANDS:");
        }
        for sub in cmd.subcommands() {
            blank_line(buf);
            blank_line(buf);
            help_rec(buf, &format!("{header} {}", sub.name()), sub, true);
        }
    }
}

fn write_lines_indented(buf: &mut String, multiline_str: &str, indent: usize) {
    for line in multiline_str.split('\n').map(str::trim_end) {
        if line.is_empty() {
            w!(buf, "\n")
        } else {
            w!(buf, "{blank:indent$}{line}\n", blank = "");
        }
    }
}

fn blank_line(buf: &mut String) {
    w!(buf, "\n");
}
