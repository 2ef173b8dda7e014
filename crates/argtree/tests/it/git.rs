use argtree::{App, Arity, Result};

pub fn app() -> Result<App> {
    let mut app = App::new("git");
    app.set_version("2.0.0").set_description("The stupid content tracker.");
    app.add_option("verbose", "-v | --verbose", false)?.help("Be more verbose.");

    let remote = app.add_command("remote")?;
    remote.set_description("Manage set of tracked repositories.");
    let add = remote.add_command("add")?;
    add.set_description("Add a remote.");
    add.add_option("track", "-t | --track", true)?.help("Branch to track.");
    add.add_operand("name", Arity::Exactly(1))?;
    add.add_operand("url", Arity::Exactly(1))?.help("Where the remote lives.");
    remote.add_command("show")?.add_operand("names", Arity::Any)?;

    let commit = app.add_command("commit")?;
    commit.set_description("Record changes to the repository.");
    commit.add_option("all", "-a | --all", false)?;
    commit.add_option("message", "-m | --message", true)?.help("Use the given message.");
    commit.add_operand("paths", Arity::Any)?;

    Ok(app)
}
