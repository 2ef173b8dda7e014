mod git;
mod tar;

use std::{cell::RefCell, ffi::OsString, rc::Rc};

use argtree::{App, Arity, Command, ErrorKind, Matches};
use expect_test::{expect, Expect};

fn args(args: &str) -> Vec<OsString> {
    args.split_ascii_whitespace().map(OsString::from).collect()
}

fn check<F>(f: F, args: &str, expect: Expect)
where
    F: FnOnce(Vec<OsString>) -> argtree::Result<Vec<Matches>>,
{
    match f(self::args(args)) {
        Ok(matches) => expect.assert_debug_eq(&matches),
        Err(err) => expect.assert_eq(&err.to_string()),
    }
}

fn check_help(app: &App, args: &str, expect: Expect) {
    let err = app.try_parse(self::args(args)).unwrap_err();
    assert!(err.is_help(), "{err}");
    expect.assert_eq(&format!("{err}\n"));
}

#[test]
fn smoke() {
    check(
        |args| tar::cmd()?.try_parse(args),
        "-cv -f out.tar src docs",
        expect![[r#"
            [
                Matches {
                    command: "tar",
                    options: {
                        "create": true,
                        "file": "out.tar",
                        "jobs": "1",
                        "verbose": true,
                    },
                    operands: {
                        "paths": [
                            "src",
                            "docs",
                        ],
                    },
                },
            ]
        "#]],
    );
    check(
        |args| tar::cmd()?.try_parse(args),
        "--file=a.tar src --jobs 4 --exclude target --file b.tar",
        expect![[r#"
            [
                Matches {
                    command: "tar",
                    options: {
                        "create": false,
                        "exclude": "target",
                        "file": "b.tar",
                        "jobs": "4",
                        "verbose": false,
                    },
                    operands: {
                        "paths": [
                            "src",
                        ],
                    },
                },
            ]
        "#]],
    );
    check(
        |args| tar::cmd()?.try_parse(args),
        "",
        expect![[r#"
            [
                Matches {
                    command: "tar",
                    options: {
                        "create": false,
                        "jobs": "1",
                        "verbose": false,
                    },
                    operands: {
                        "paths": [],
                    },
                },
            ]
        "#]],
    );
}

#[test]
fn short_clusters() {
    check(
        |args| tar::cmd()?.try_parse(args),
        "-cvfout -j8",
        expect![[r#"
            [
                Matches {
                    command: "tar",
                    options: {
                        "create": true,
                        "file": "out",
                        "jobs": "8",
                        "verbose": true,
                    },
                    operands: {
                        "paths": [],
                    },
                },
            ]
        "#]],
    );
    check(
        |args| tar::cmd()?.try_parse(args),
        "-vf -c",
        expect![[r#"
            [
                Matches {
                    command: "tar",
                    options: {
                        "create": false,
                        "file": "-c",
                        "jobs": "1",
                        "verbose": true,
                    },
                    operands: {
                        "paths": [],
                    },
                },
            ]
        "#]],
    );

    let parse = |s: &str| tar::cmd().unwrap().try_parse(args(s)).unwrap();
    assert_eq!(parse("-cv"), parse("-c -v"));
    assert_eq!(parse("-vc"), parse("-c -v"));
    assert_eq!(parse("-cv x"), parse("-v -c x"));
}

#[test]
fn long_values() {
    let parse = |s: &str| tar::cmd().unwrap().try_parse(args(s)).unwrap();
    assert_eq!(parse("--file=x.tar"), parse("--file x.tar"));
    assert_eq!(parse("--file=x.tar")[0].value("file"), Some("x.tar"));
    assert_eq!(parse("--exclude=")[0].value("exclude"), Some(""));
    assert_eq!(parse("--exclude=a=b")[0].value("exclude"), Some("a=b"));
    assert_eq!(parse("--jobs 3 --jobs 5")[0].get::<u32>("jobs").unwrap(), Some(5));
}

#[test]
fn option_errors() {
    check(|args| tar::cmd()?.try_parse(args), "--bogus", expect!["unknown argument `--bogus`"]);
    check(|args| tar::cmd()?.try_parse(args), "-cx", expect!["unknown argument `-x`"]);
    check(|args| tar::cmd()?.try_parse(args), "src -f", expect!["expected a value for `-f`"]);
    check(
        |args| tar::cmd()?.try_parse(args),
        "--jobs=many",
        expect!["invalid value `many` for `--jobs`"],
    );
    check(|args| tar::cmd()?.try_parse(args), "-jx", expect!["invalid value `x` for `-j`"]);
    check(
        |args| tar::cmd()?.try_parse(args),
        "--create=yes",
        expect!["flag `--create` doesn't take a value"],
    );

    let kind = |s: &str| tar::cmd().unwrap().try_parse(args(s)).unwrap_err().kind();
    assert_eq!(kind("--bogus"), ErrorKind::UnknownOption);
    assert_eq!(kind("--file"), ErrorKind::MissingOptionValue);
    assert_eq!(kind("-j x"), ErrorKind::InvalidOptionValue);
    assert_eq!(kind("--create=1"), ErrorKind::UnexpectedOptionValue);
}

#[test]
fn double_dash() {
    check(
        |args| tar::cmd()?.try_parse(args),
        "-v -- -c --help --",
        expect![[r#"
            [
                Matches {
                    command: "tar",
                    options: {
                        "create": false,
                        "jobs": "1",
                        "verbose": true,
                    },
                    operands: {
                        "paths": [
                            "-c",
                            "--help",
                            "--",
                        ],
                    },
                },
            ]
        "#]],
    );
    check(
        |args| tar::cmd()?.try_parse(args),
        "-f -- -c",
        expect![[r#"
            [
                Matches {
                    command: "tar",
                    options: {
                        "create": true,
                        "file": "--",
                        "jobs": "1",
                        "verbose": false,
                    },
                    operands: {
                        "paths": [],
                    },
                },
            ]
        "#]],
    );
}

#[test]
fn operand_distribution() {
    check(
        |args| mv::cmd()?.try_parse(args),
        "a b c -f d e",
        expect![[r#"
            [
                Matches {
                    command: "mv",
                    options: {
                        "force": true,
                    },
                    operands: {
                        "first": "a",
                        "last": "e",
                        "middle": [
                            "b",
                            "c",
                            "d",
                        ],
                    },
                },
            ]
        "#]],
    );
    check(
        |args| mv::cmd()?.try_parse(args),
        "a",
        expect!["not enough arguments -- available 1, expected 2"],
    );
    check(
        |args| mv::pair()?.try_parse(args),
        "x",
        expect!["not enough arguments -- available 1, expected 2"],
    );
    check(|args| mv::pair()?.try_parse(args), "x 1 2", expect!["too many arguments for `2`"]);
    check(
        |args| mv::pair()?.try_parse(args),
        "x -- 1 2",
        expect!["too many arguments -- available 3, expected 2"],
    );
    check(
        |args| mv::pair()?.try_parse(args),
        "x y",
        expect!["invalid value `y` for operand `right`"],
    );
    check(
        |args| mv::pair()?.try_parse(args),
        "x -- -1",
        expect![[r#"
            [
                Matches {
                    command: "pair",
                    options: {},
                    operands: {
                        "left": "x",
                        "right": "-1",
                    },
                },
            ]
        "#]],
    );

    let kind = |s: &str| mv::pair().unwrap().try_parse(args(s)).unwrap_err().kind();
    assert_eq!(kind("x"), ErrorKind::OperandCount);
    assert_eq!(kind("x 1 2"), ErrorKind::UnresolvedToken);
    assert_eq!(kind("x y"), ErrorKind::InvalidOperandValue);
}

#[test]
fn subcommands() {
    check(
        |args| git::app()?.try_parse(args),
        "-v commit -am fix src lib",
        expect![[r#"
            [
                Matches {
                    command: "git",
                    options: {
                        "verbose": true,
                    },
                    operands: {},
                },
                Matches {
                    command: "commit",
                    options: {
                        "all": true,
                        "message": "fix",
                    },
                    operands: {
                        "paths": [
                            "src",
                            "lib",
                        ],
                    },
                },
            ]
        "#]],
    );
    check(
        |args| git::app()?.try_parse(args),
        "remote add origin --track=main https://example.com/repo.git",
        expect![[r#"
            [
                Matches {
                    command: "git",
                    options: {
                        "verbose": false,
                    },
                    operands: {},
                },
                Matches {
                    command: "remote",
                    options: {},
                    operands: {},
                },
                Matches {
                    command: "add",
                    options: {
                        "track": "main",
                    },
                    operands: {
                        "name": "origin",
                        "url": "https://example.com/repo.git",
                    },
                },
            ]
        "#]],
    );
    check(
        |args| git::app()?.try_parse(args),
        "remote show",
        expect![[r#"
            [
                Matches {
                    command: "git",
                    options: {
                        "verbose": false,
                    },
                    operands: {},
                },
                Matches {
                    command: "remote",
                    options: {},
                    operands: {},
                },
                Matches {
                    command: "show",
                    options: {},
                    operands: {
                        "names": [],
                    },
                },
            ]
        "#]],
    );
}

#[test]
fn subcommand_errors() {
    check(|args| git::app()?.try_parse(args), "bogus", expect!["too many arguments for `bogus`"]);
    check(
        |args| git::app()?.try_parse(args),
        "commit --verbose",
        expect!["unknown argument `--verbose`"],
    );
    check(
        |args| git::app()?.try_parse(args),
        "remote add origin",
        expect!["not enough arguments -- available 1, expected 2"],
    );
    check(
        |args| git::app()?.try_parse(args),
        "-- commit",
        expect!["too many arguments -- available 1, expected 0"],
    );
}

#[test]
fn operands_take_precedence_over_subcommands() {
    let mut cmd = Command::new("run");
    cmd.add_operand("script", Arity::Exactly(1)).unwrap();
    cmd.add_command("script").unwrap();

    let res = cmd.try_parse(args("script script")).unwrap();
    assert_eq!(res.len(), 2);
    assert_eq!(res[0].value("script"), Some("script"));
    assert_eq!(res[1].command(), "script");
}

fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&Matches) + Clone) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let action = {
        let log = Rc::clone(&log);
        move |m: &Matches| log.borrow_mut().push(format!("{} {:?}", m.command(), m.options()))
    };
    (log, action)
}

#[test]
fn actions_run_root_first() {
    let (log, action) = recorder();
    let mut root = Command::new("root");
    root.set_action(action.clone());
    let sub1 = root.add_command("sub1").unwrap();
    sub1.set_action(action.clone());
    let sub2 = sub1.add_command("sub2").unwrap();
    sub2.set_action(action);
    sub2.add_option("flag", "--flag", true).unwrap();

    let res = root.try_parse(args("sub1 sub2 --flag x")).unwrap();
    assert!(res.iter().all(|it| it.operands().is_empty()));
    assert_eq!(res[2].value("flag"), Some("x"));
    expect![[r#"
        [
            "root {}",
            "sub1 {}",
            "sub2 {\"flag\": \"x\"}",
        ]
    "#]]
    .assert_debug_eq(&log.borrow());

    log.borrow_mut().clear();
    let err = root.try_parse(args("--bogus sub1")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownOption);
    assert!(log.borrow().is_empty());

    let err = root.try_parse(args("sub1 --flag x")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownOption);
    assert_eq!(*log.borrow(), ["root {}"]);
}

#[test]
fn on_match_sees_every_occurrence() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut cmd = Command::new("t");
    cmd.add_option("define", "-D", true).unwrap().on_match({
        let seen = Rc::clone(&seen);
        move |value| seen.borrow_mut().push(value.clone())
    });

    let res = cmd.try_parse(args("-Dx1 -D b=2")).unwrap();
    assert_eq!(res[0].value("define"), Some("b=2"));
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn trees_are_reusable() {
    let cmd = tar::cmd().unwrap();
    let first = cmd.try_parse(args("-c -f a.tar x")).unwrap();
    let second = cmd.try_parse(args("-c -f a.tar x")).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, tar::cmd().unwrap().try_parse(args("-c -f a.tar x")).unwrap());

    let fresh = cmd.try_parse(args("")).unwrap();
    assert!(!fresh[0].flag("create"));
    assert_eq!(fresh[0].value("file"), None);
}

#[test]
fn version() {
    let app = git::app().unwrap();
    check_help(
        &app,
        "--version",
        expect![[r#"
            git 2.0.0
        "#]],
    );
    check_help(
        &app,
        "-v --version commit",
        expect![[r#"
            git 2.0.0
        "#]],
    );

    let mut app = App::new("tool");
    app.set("commit", "abc123").set_version_template("${name} v${version} (${commit}, ${date})");
    assert_eq!(app.version_string(), "tool v0.0.0 (abc123, ${date})");
    let err = app.try_parse(args("--version")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayVersion);
}

#[test]
fn help() {
    let app = git::app().unwrap();
    check_help(
        &app,
        "--help",
        expect![[r#"
            git
              The stupid content tracker.

            OPTIONS:
                --version
                  Print version info.

                -h, --help
                  Print help information.

                -v, --verbose
                  Be more verbose.

            SUBCOMMANDS:

            git help
              Display help for a subcommand.

              ARGS:
                [<command>...]
                  Command to get help for.


            git remote
              Manage set of tracked repositories.


            git remote add
              Add a remote.

              ARGS:
                <name>

                <url>
                  Where the remote lives.

              OPTIONS:
                -t, --track <track>
                  Branch to track.


            git remote show

              ARGS:
                [<names>...]


            git commit
              Record changes to the repository.

              ARGS:
                [<paths>...]

              OPTIONS:
                -a, --all

                -m, --message <message>
                  Use the given message.
        "#]],
    );

    let err = app.try_parse(args("-h")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    assert_eq!(err.to_string(), app.help());
    assert_eq!(app.try_parse(args("help")).unwrap_err().to_string(), app.help());
}

#[test]
fn help_command() {
    let app = git::app().unwrap();
    check_help(
        &app,
        "help remote add",
        expect![[r#"
            git remote add
              Add a remote.

            ARGS:
                <name>

                <url>
                  Where the remote lives.

            OPTIONS:
                -t, --track <track>
                  Branch to track.
        "#]],
    );
    check(|args| app.try_parse(args), "help nope", expect![[r#"unknown command "nope""#]]);
    check(
        |args| app.try_parse(args),
        "help remote nope",
        expect![[r#"unknown command "remote -> nope""#]],
    );
    assert_eq!(app.try_parse(args("help commit -a")).unwrap_err().kind(), ErrorKind::UnknownOption);
}

#[test]
fn default_action() {
    let calls = Rc::new(RefCell::new(0));
    let mut app = App::new("tool");
    app.add_option("quiet", "-q", false).unwrap();
    app.set_default_action({
        let calls = Rc::clone(&calls);
        move || *calls.borrow_mut() += 1
    });

    app.try_parse(args("")).unwrap();
    assert_eq!(*calls.borrow(), 1);
    app.try_parse(args("-q")).unwrap();
    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn build_errors() {
    let mut app = App::new("tool");
    let err = app.add_option("host", "-h | --host", true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Build);
    assert_eq!(err.to_string(), "flag `-h` of option `host` is already used by option `help`");

    let err = app.add_option("bad", "--bad=1", true).unwrap_err();
    assert_eq!(err.to_string(), "invalid flag `--bad=1` in `--bad=1`, expected `-x` or `--name`");

    app.add_command("help").unwrap();
    assert_eq!(app.add_command("help").unwrap_err().kind(), ErrorKind::Build);
    assert!(!app.root().subcommands().is_empty());
}

#[cfg(unix)]
#[test]
fn non_utf8() {
    use std::os::unix::ffi::OsStringExt;

    let cmd = tar::cmd().unwrap();
    let err = cmd.try_parse(vec![OsString::from_vec(vec![0xff])]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidUtf8);
}
