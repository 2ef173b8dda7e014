use argtree::{Arity, Command, Result};

pub fn cmd() -> Result<Command> {
    let mut cmd = Command::new("tar");
    cmd.set_description("An archiving utility.");
    cmd.add_option("create", "-c | --create", false)?;
    cmd.add_option("verbose", "-v | --verbose", false)?;
    cmd.add_option("file", "-f | --file", true)?.help("Use archive file.");
    cmd.add_option("jobs", "-j | --jobs", true)?.parses::<u32>().default("1");
    cmd.add_option("exclude", "--exclude", true)?;
    cmd.add_operand("paths", Arity::Any)?;
    Ok(cmd)
}
