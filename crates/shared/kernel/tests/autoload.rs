use anyhow::Context;
use axum::routing::get;
use std::fmt;
use std::sync::{Arc, Mutex};
use tessera_kernel::autoload::{HookKind, LoadEvent};
use tessera_kernel::prelude::*;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context as LayerContext, Layer, SubscriberExt};

fn settings(raw: &str) -> Settings {
    Settings::from_toml(raw).unwrap()
}

fn site_router() -> SubappRouter {
    SubappRouter::new().route("/", get(|| async { "site" }))
}

fn serve(registry: ModuleRegistry, host: &mut HostApp) -> Autoloader {
    Autoloader::builder(registry).mode(Mode::Serve).build(host).unwrap()
}

/// Level and message of every event emitted on the `autoload` target.
#[derive(Clone, Default)]
struct AutoloadLog(Arc<Mutex<Vec<(Level, String)>>>);

impl AutoloadLog {
    fn at(&self, level: Level) -> Vec<String> {
        let events = self.0.lock().unwrap();
        events.iter().filter(|(l, _)| *l == level).map(|(_, m)| m.clone()).collect()
    }
}

struct MessageVisitor<'a>(&'a mut String);

impl Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            *self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for AutoloadLog {
    fn on_event(&self, event: &Event<'_>, _ctx: LayerContext<'_, S>) {
        if event.metadata().target() != "autoload" {
            return;
        }
        let mut message = String::new();
        event.record(&mut MessageVisitor(&mut message));
        self.0.lock().unwrap().push((*event.metadata().level(), message));
    }
}

fn logged<T>(run: impl FnOnce() -> T) -> (T, AutoloadLog) {
    let log = AutoloadLog::default();
    let subscriber = tracing_subscriber::registry().with(log.clone());
    (tracing::subscriber::with_default(subscriber, run), log)
}

#[test]
fn serve_mode_mounts_routes_and_skips_missing_ones() {
    let mut registry = ModuleRegistry::default();
    registry
        .subapp("site")
        .config(settings(r#"installed_subapps = ["billing"]"#))
        .route(Module::router(site_router()));
    registry.subapp("billing");

    let mut host = HostApp::new();
    let autoloader = serve(registry, &mut host);

    assert_eq!(autoloader.mode(), Mode::Serve);
    assert_eq!(host.mounted_routes(), 1);
    let report = autoloader.report();
    assert_eq!(report.subapps(), ["site", "billing"]);
    assert_eq!(report.mounted().collect::<Vec<_>>(), ["app.site.route"]);
    assert_eq!(
        report.skipped().map(ToString::to_string).collect::<Vec<_>>(),
        ["app.site.event", "app.billing.route", "app.billing.event"]
    );
    assert_eq!(report.violations().count(), 0);
    assert!(autoloader.managers().is_empty());
}

#[test]
fn subapps_without_modules_are_a_no_op() {
    let mut registry = ModuleRegistry::default();
    registry.subapp("site").config(settings(r#"installed_subapps = ["ghost"]"#));

    let mut host = HostApp::new();
    let autoloader = serve(registry, &mut host);

    assert_eq!(host.mounted_routes(), 0);
    assert!(host.startup_hooks().is_empty());
    assert_eq!(autoloader.report().skipped().count(), 4);
    assert_eq!(autoloader.report().violations().count(), 0);
}

#[test]
fn wrong_router_type_is_a_single_violation() {
    let mut registry = ModuleRegistry::default();
    registry
        .subapp("site")
        .config(Settings::default())
        .route(Module::new().with("router", Export::Value(serde_json::json!("not a router"))));

    let mut host = HostApp::new();
    let autoloader = serve(registry, &mut host);

    assert_eq!(host.mounted_routes(), 0);
    let violations: Vec<_> = autoloader.report().violations().collect();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].export, "router");
    assert_eq!(violations[0].expected, "Router");
    assert_eq!(violations[0].found, Some("Value"));
}

#[test]
fn missing_router_export_is_a_violation() {
    let mut registry = ModuleRegistry::default();
    registry.subapp("site").config(Settings::default()).route(Module::new());

    let mut host = HostApp::new();
    let autoloader = serve(registry, &mut host);

    let violation = autoloader.report().violations().next().expect("violation");
    assert_eq!(violation.path, "app.site.route");
    assert_eq!(violation.found, None);
}

#[test]
fn main_subapp_is_loaded_once() {
    let mut registry = ModuleRegistry::default();
    registry
        .subapp("site")
        .config(settings(r#"installed_subapps = ["site", "billing", "site", "billing"]"#))
        .route(Module::router(site_router()));
    registry.subapp("billing");

    let mut host = HostApp::new();
    let autoloader = serve(registry, &mut host);

    assert_eq!(autoloader.report().subapps(), ["site", "billing"]);
    assert_eq!(host.mounted_routes(), 1);
}

#[test]
fn custom_main_subapp_and_namespace() {
    let mut registry = ModuleRegistry::new(ModuleResolver::new("portal"));
    registry
        .subapp("core")
        .config(Settings::default())
        .route(Module::router(site_router()));

    let mut host = HostApp::new();
    let autoloader =
        Autoloader::builder(registry).main_subapp("core").mode(Mode::Serve).build(&mut host).unwrap();

    assert_eq!(autoloader.report().mounted().collect::<Vec<_>>(), ["portal.core.route"]);
    assert_eq!(autoloader.context().main_subapp(), "core");
}

#[test]
fn missing_main_config_is_fatal() {
    let mut registry = ModuleRegistry::default();
    registry.subapp("site").route(Module::router(site_router()));

    let mut host = HostApp::new();
    let err = Autoloader::builder(registry).mode(Mode::Serve).build(&mut host).expect_err("no config");
    assert!(matches!(err, AutoloadError::MissingConfig { .. }));
}

#[test]
fn host_context_is_uninitialized_before_autoload() {
    let host = HostApp::new();
    assert!(matches!(host.context(), Err(AutoloadError::Uninitialized { .. })));
}

#[test]
fn install_hook_runs_immediately_with_the_context_attached() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let captured = Arc::clone(&seen);

    let mut registry = ModuleRegistry::default();
    registry
        .subapp("site")
        .config(settings(r#"project_name = "starter""#))
        .event(Module::new().on_install(move |host| {
            let name: String = host.context()?.config("project_name", String::new())?;
            captured.lock().unwrap().push(name);
            Ok(())
        }));

    let mut host = HostApp::new();
    let autoloader = serve(registry, &mut host);

    assert_eq!(*seen.lock().unwrap(), ["starter"]);
    assert_eq!(autoloader.report().hooks().collect::<Vec<_>>(), [("site", HookKind::Install)]);
}

#[test]
fn failing_install_hook_aborts_the_run() {
    let mut registry = ModuleRegistry::default();
    registry
        .subapp("site")
        .config(Settings::default())
        .event(Module::new().on_install(|_| anyhow::bail!("database unreachable")));

    let mut host = HostApp::new();
    let err = Autoloader::builder(registry).mode(Mode::Serve).build(&mut host).expect_err("hook");
    assert!(matches!(err, AutoloadError::Hook { .. }));
    assert!(err.to_string().contains("database unreachable"));
}

#[test]
fn non_callable_hooks_are_violations() {
    let mut registry = ModuleRegistry::default();
    registry.subapp("site").config(Settings::default()).event(
        Module::new()
            .with("on_startup", Export::Value(serde_json::json!(true)))
            .on_shutdown(|| async { Ok(()) }),
    );

    let mut host = HostApp::new();
    let autoloader = serve(registry, &mut host);

    assert!(host.startup_hooks().is_empty());
    assert_eq!(host.shutdown_hooks().len(), 1);
    let violation = autoloader.report().violations().next().expect("violation");
    assert_eq!((violation.export, violation.found), ("on_startup", Some("Value")));
}

fn recording_module(log: &Arc<Mutex<Vec<String>>>, subapp: &'static str) -> Module {
    let (start, stop) = (Arc::clone(log), Arc::clone(log));
    Module::new()
        .on_startup(move || {
            let log = Arc::clone(&start);
            async move {
                log.lock().unwrap().push(format!("start:{subapp}"));
                Ok(())
            }
        })
        .on_shutdown(move || {
            let log = Arc::clone(&stop);
            async move {
                log.lock().unwrap().push(format!("stop:{subapp}"));
                anyhow::ensure!(subapp != "site", "flush failed");
                Ok(())
            }
        })
}

#[tokio::test]
async fn lifecycle_hooks_run_in_load_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ModuleRegistry::default();
    registry
        .subapp("site")
        .config(settings(r#"installed_subapps = ["billing"]"#))
        .event(recording_module(&log, "site"));
    registry.subapp("billing").event(recording_module(&log, "billing"));

    let mut host = HostApp::new();
    let autoloader = serve(registry, &mut host);
    assert_eq!(autoloader.report().hooks().count(), 4);

    host.startup().await.unwrap();
    host.shutdown().await;

    assert_eq!(
        *log.lock().unwrap(),
        ["start:site", "start:billing", "stop:site", "stop:billing"]
    );
}

#[tokio::test]
async fn failing_startup_hook_stops_the_chain() {
    let calls = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&calls);

    let mut host = HostApp::new();
    host.append_startup_hook(LifecycleHook::new(|| async { anyhow::bail!("boom") }));
    host.append_startup_hook(LifecycleHook::new(move || {
        let counter = Arc::clone(&counter);
        async move {
            *counter.lock().unwrap() += 1;
            Ok(())
        }
    }));

    let err = host.startup().await.expect_err("first hook fails");
    assert!(matches!(err, HostError::Startup { .. }));
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[test]
fn manage_mode_collects_managers_only() {
    let mut registry = ModuleRegistry::default();
    let mut site = Manager::new();
    site.add_command("rm-cache", None, Action::new("rm_cache", |_| Ok(())), Vec::new());
    registry
        .subapp("site")
        .config(settings(r#"installed_subapps = ["billing", "audit", "legacy"]"#))
        .route(Module::router(site_router()))
        .command(Module::manager(site));
    registry.subapp("billing").command(Module::manager(Manager::new().with_title("Payments")));
    registry.subapp("audit").command(Module::new());
    registry
        .subapp("legacy")
        .command(Module::new().with("manager", Export::Value(serde_json::json!({}))));

    let mut host = HostApp::new();
    let autoloader = Autoloader::builder(registry).mode(Mode::Manage).build(&mut host).unwrap();

    assert_eq!(host.mounted_routes(), 0);
    let titles: Vec<_> = autoloader.managers().iter().filter_map(Manager::title).collect();
    assert_eq!(titles, ["site", "Payments"]);
    assert_eq!(autoloader.report().skipped().count(), 0);
    assert_eq!(autoloader.report().violations().count(), 1);
    assert!(autoloader.report().events().iter().any(|e| matches!(
        e,
        LoadEvent::ManagerCollected { subapp, commands: 1, .. } if subapp == "site"
    )));
}

#[test]
fn context_imports_registered_modules() {
    let mut registry = ModuleRegistry::default();
    registry
        .subapp("site")
        .config(Settings::default())
        .module("models", Module::new().with("tables", Export::Value(serde_json::json!(["user"]))));

    let mut host = HostApp::new();
    let autoloader = serve(registry, &mut host);
    let context = autoloader.context();

    let models = context.import_module("site", "models").unwrap();
    assert!(matches!(models.get("tables"), Some(Export::Value(_))));
    assert!(matches!(
        context.import_module("billing", "models"),
        Err(AutoloadError::ModuleNotFound { .. })
    ));
    assert!(Arc::ptr_eq(host.context().unwrap(), context));
}

#[test]
fn serve_scenario_logs_one_route_skip_at_info() {
    let mut registry = ModuleRegistry::default();
    registry
        .subapp("site")
        .config(settings(r#"installed_subapps = ["billing"]"#))
        .route(Module::router(site_router()));
    registry.subapp("billing");

    let mut host = HostApp::new();
    let (_autoloader, log) = logged(|| serve(registry, &mut host));

    let route_skips: Vec<_> =
        log.at(Level::INFO).into_iter().filter(|m| m.starts_with("Skipping route")).collect();
    assert_eq!(route_skips.len(), 1);
    assert!(log.at(Level::ERROR).is_empty());
    assert!(log.at(Level::WARN).is_empty());
}

#[test]
fn wrong_router_type_logs_exactly_one_error() {
    let mut registry = ModuleRegistry::default();
    registry
        .subapp("site")
        .config(Settings::default())
        .route(Module::new().with("router", Export::Value(serde_json::json!(42))));

    let mut host = HostApp::new();
    let (_autoloader, log) = logged(|| serve(registry, &mut host));

    assert_eq!(log.at(Level::ERROR), ["`router` is not a Router"]);
}

#[test]
fn absent_command_modules_stay_below_info() {
    let mut registry = ModuleRegistry::default();
    registry.subapp("site").config(settings(r#"installed_subapps = ["billing"]"#));
    registry.subapp("billing");

    let mut host = HostApp::new();
    let (_autoloader, log) = logged(|| {
        Autoloader::builder(registry).mode(Mode::Manage).build(&mut host).unwrap()
    });

    assert_eq!(log.at(Level::TRACE).iter().filter(|m| *m == "No command module").count(), 2);
    assert!(log.at(Level::INFO).iter().all(|m| !m.contains("command")));
    assert!(log.at(Level::ERROR).is_empty());
}

#[test]
fn autoload_errors_take_anyhow_context() {
    let registry = ModuleRegistry::default();
    let err = registry
        .import("site", "models")
        .map(|_| ())
        .context("Loading site models")
        .expect_err("nothing registered");

    assert_eq!(err.to_string(), "Loading site models");
    assert!(matches!(
        err.downcast_ref::<AutoloadError>(),
        Some(AutoloadError::ModuleNotFound { .. })
    ));
}
