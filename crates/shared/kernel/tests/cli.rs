use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tessera_kernel::prelude::*;

type Calls = Arc<Mutex<Vec<CommandArgs>>>;

fn recorder(ident: &'static str, calls: &Calls) -> Action {
    let calls = Arc::clone(calls);
    Action::new(ident, move |args| {
        calls.lock().unwrap().push(args);
        Ok(())
    })
}

fn subapp(_: CommandArgs) -> anyhow::Result<()> {
    Ok(())
}

#[test]
fn declarative_flags_and_positionals() {
    let mut manager = Manager::new();
    manager.declare(
        action!(subapp, "Create a new subapp."),
        Metadata::new()
            .arg("name", Argument::new().help("Subapp name"))
            .arg(
                "main_subapp",
                Argument::flags(["-m", "--main_subapp"]).value_type(ValueType::Bool),
            )
            .arg("route", Argument::flags(["-r", "--route"])),
    );

    let command = &manager.commands()[0];
    let route = &command.arguments[2];
    assert_eq!(route.name_or_flags, ["-r", "--route"]);
    let name = &command.arguments[0];
    assert!(name.is_positional());
    assert_eq!(name.name_or_flags, ["name"]);

    let cli = CliBuilder::new("manager").manager(manager).build().unwrap();
    let flags: Vec<_> = cli
        .command()
        .find_subcommand("subapp")
        .and_then(|c| c.get_arguments().find(|a| a.get_id() == "route"))
        .map(|a| (a.get_short(), a.get_long().map(ToOwned::to_owned)))
        .into_iter()
        .collect();
    assert_eq!(flags, [(Some('r'), Some("route".to_owned()))]);
}

#[test]
fn last_registered_sync_wins() {
    let site_calls = Calls::default();
    let billing_calls = Calls::default();

    let mut site = Manager::new().with_title("site");
    site.add_command("sync", Some("Sync site".to_owned()), recorder("sync", &site_calls), Vec::new());
    site.add_command("rm-cache", None, recorder("rm_cache", &site_calls), Vec::new());
    let mut billing = Manager::new().with_title("billing");
    let billing_sync = recorder("sync", &billing_calls);
    billing.add_command("sync", Some("Sync billing".to_owned()), billing_sync.clone(), Vec::new());

    let cli = CliBuilder::new("manager").managers([site, billing]).build().unwrap();

    assert_eq!(cli.names().collect::<Vec<_>>(), ["sync", "rm-cache"]);
    assert!(cli.action("sync").unwrap().ptr_eq(&billing_sync));
    assert_eq!(cli.provider("sync"), Some("billing"));

    let dispatch = cli.dispatch(["manager", "sync"], "/srv").unwrap();
    assert!(dispatch.is_success());
    assert!(site_calls.lock().unwrap().is_empty());
    assert_eq!(billing_calls.lock().unwrap().len(), 1);
}

#[test]
fn rm_cache_receives_only_root_dir() {
    let calls = Calls::default();
    let mut site = Manager::new();
    site.add_command("rm-cache", None, recorder("rm_cache", &calls), Vec::new());

    let mut registry = ModuleRegistry::default();
    registry.subapp("site").config(Settings::default()).command(Module::manager(site));
    let mut host = HostApp::new();
    let autoloader = Autoloader::builder(registry).mode(Mode::Manage).build(&mut host).unwrap();
    let cli = autoloader.cli("manager").unwrap();

    let dispatch = cli.dispatch(["manager", "rm-cache"], PathBuf::from("/srv/project")).unwrap();
    assert!(matches!(dispatch, Dispatch::Completed { ref command, outcome: Ok(()) } if command == "rm-cache"));

    let calls = calls.lock().unwrap();
    let args = &calls[0];
    assert!(args.values().is_empty());
    assert_eq!(args.root_dir(), Path::new("/srv/project"));
    assert_eq!(args.context().unwrap().main_subapp(), "site");
}

#[test]
fn parsed_values_are_passed_by_destination() {
    let calls = Calls::default();
    let mut manager = Manager::new();
    manager.declare(
        recorder("subapp", &calls),
        Metadata::new()
            .arg("name", Argument::new())
            .arg("main_subapp", Argument::flags(["-m", "--main_subapp"]).value_type(ValueType::Bool))
            .arg("route", Argument::flags(["-r", "--route"]).help("Route prefix")),
    );
    let cli = CliBuilder::new("manager").manager(manager).build().unwrap();

    cli.dispatch(["manager", "subapp", "blog", "-r", "/blog"], ".").unwrap();
    cli.dispatch(["manager", "subapp", "shop", "--main_subapp"], ".").unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls[0].string("name"), Some("blog"));
    assert_eq!(calls[0].string("route"), Some("/blog"));
    assert!(!calls[0].flag("main_subapp"));
    assert_eq!(calls[1].string("name"), Some("shop"));
    assert!(calls[1].flag("main_subapp"));
    assert_eq!(calls[1].get("route"), None);
}

#[test]
fn no_subcommand_renders_help() {
    let mut manager = Manager::new().with_title("site");
    manager.add_command("rm-cache", Some("Remove build caches".to_owned()), Action::new("rm_cache", |_| Ok(())), Vec::new());
    let cli = CliBuilder::new("manager").about("Project manager").manager(manager).build().unwrap();

    let Dispatch::Help(help) = cli.dispatch(["manager"], ".").unwrap() else {
        panic!("expected help");
    };
    assert!(help.contains("rm-cache"));
    assert!(help.contains("Remove build caches"));
}

#[test]
fn unknown_subcommand_is_a_parser_error() {
    let mut manager = Manager::new();
    manager.add_command("rm-cache", None, Action::new("rm_cache", |_| Ok(())), Vec::new());
    let cli = CliBuilder::new("manager").manager(manager).build().unwrap();

    let err = cli.dispatch(["manager", "deploy"], ".").expect_err("unknown");
    assert_eq!(err.kind(), clap::error::ErrorKind::InvalidSubcommand);
    assert_ne!(err.exit_code(), 0);
}

#[test]
fn action_failure_is_reported() {
    let mut manager = Manager::new();
    manager.add_command("migrate", None, Action::new("migrate", |_| anyhow::bail!("no database")), Vec::new());
    let cli = CliBuilder::new("manager").manager(manager).build().unwrap();

    let dispatch = cli.dispatch(["manager", "migrate"], ".").unwrap();
    assert!(!dispatch.is_success());
}

#[test]
fn subcommand_help_names_the_provider() {
    let mut manager = Manager::new().with_title("billing");
    manager.add_command("invoice", None, Action::new("invoice", |_| Ok(())), Vec::new());
    let cli = CliBuilder::new("manager").manager(manager).build().unwrap();

    let err = cli.dispatch(["manager", "invoice", "--help"], ".").expect_err("help is an error kind");
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    assert!(err.to_string().contains("Provided by: billing"));
}
