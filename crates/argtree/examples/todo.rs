use argtree::{App, Arity, Matches};
use tracing_subscriber::EnvFilter;

fn app() -> argtree::Result<App> {
    let mut app = App::new("todo");
    app.set_version(env!("CARGO_PKG_VERSION"))
        .set_version_template("${name} ${version} (argtree demo)")
        .set_description("Keeps a list of things to do.")
        .set_default_action(|| println!("nothing to do, try `todo help`"));
    app.add_option("file", "-f | --file", true)?.help("List to work on.").default("todo.txt");

    let add = app.add_command("add")?;
    add.set_description("Add an item.").set_action(|m: &Matches| {
        let priority = m.value("priority").unwrap_or("normal");
        println!("adding {:?} with {priority} priority", m.values("words").join(" "));
    });
    add.add_option("priority", "-p | --priority", true)?
        .help("One of low, normal or high.")
        .validate(|raw| matches!(raw, "low" | "normal" | "high"));
    add.add_operand("words", Arity::Any)?;

    let done = app.add_command("done")?;
    done.set_description("Mark an item as done.").set_action(|m: &Matches| {
        if let Ok(Some(id)) = m.get::<u32>("id") {
            println!("done: #{id}");
        }
    });
    done.add_operand("id", Arity::Exactly(1))?.parses::<u32>();

    app.set_action(|m: &Matches| {
        tracing::info!(file = m.value("file").unwrap_or_default(), "using list");
    });
    Ok(app)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let app = app()?;
    let matches = app.from_env_or_exit();
    tracing::debug!(levels = matches.len(), "parsed");
    Ok(())
}
